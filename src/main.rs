use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use encoding_rs::Encoding;

use srtstats::freq::{self, FrequencyMap};
use srtstats::loader::{self, LoadMode, LoadOptions};
use srtstats::sink::{NullSink, SqliteSink, WordSink};
use srtstats::tagger;

/// Count Japanese words across SRT subtitle files.
#[derive(Parser)]
#[derive(Debug)]
#[command(version)]
struct Args {
    /// Subtitle files to load; counts are shared across all of them
    #[arg(required = true)]
    files : Vec<PathBuf>,

    /// Compiled vibrato system dictionary (.dic, or .dic.zst)
    #[arg(long)]
    dict : PathBuf,

    /// Only tokenize the first text line of each item (dual-language subtitles)
    #[arg(long)]
    first_line_only : bool,

    /// Text encoding of the subtitle files, e.g. shift_jis or gb18030
    #[arg(long, value_parser = parse_encoding)]
    encoding : Option<&'static Encoding>,

    /// SQLite database to record files, items and words in
    #[arg(long)]
    db : Option<PathBuf>,

    /// Empty the database tables before loading
    #[arg(long, requires = "db")]
    clear_db : bool,

    /// Record which item every word occurrence came from
    #[arg(long, requires = "db")]
    link_words : bool,

    /// Words seen fewer times than this are left out of the filtered totals and details
    #[arg(long, default_value_t = 1)]
    min_count : u64,

    /// Print one `word,count` line per word
    #[arg(long)]
    details : bool,

    /// Also write the frequency list to this CSV file
    #[arg(long)]
    csv : Option<PathBuf>,
}

fn parse_encoding(label : &str) -> std::result::Result<&'static Encoding, String>
{
    Encoding::for_label(label.as_bytes()).ok_or_else(|| format!("unknown encoding `{}`", label))
}

fn run(args : &Args) -> Result<()>
{
    let tokenizer = tagger::load_tokenizer(&args.dict).with_context(|| format!("loading dictionary {}", args.dict.display()))?;
    let mut worker = tokenizer.new_worker();

    let mut sink : Box<dyn WordSink> = match &args.db
    {
        Some(path) => Box::new(SqliteSink::new(path)),
        None => Box::new(NullSink)
    };
    if args.clear_db
    {
        log::info!("clearing database");
        sink.clear_db().context("clearing database")?;
    }
    sink.connect().context("connecting to database")?;

    let options = LoadOptions {
        mode : if args.first_line_only { LoadMode::FirstLineOnly } else { LoadMode::FullText },
        encoding : args.encoding,
        link_words : args.link_words,
    };

    let mut words = FrequencyMap::new();
    for path in &args.files
    {
        log::info!("loading {}", path.display());
        loader::load_subtitle(sink.as_mut(), path, &options, &mut worker, &mut words).with_context(|| format!("loading {}", path.display()))?;
    }

    if args.db.is_some()
    {
        log::info!("storing {} words", words.len());
        freq::store_words(&words, sink.as_mut()).context("storing words")?;
    }
    sink.commit().context("committing")?;
    sink.close()?;

    if let Some(path) = &args.csv
    {
        let file = BufWriter::new(File::create(path).with_context(|| format!("creating {}", path.display()))?);
        freq::write_csv(&words, args.min_count, file)?;
        log::info!("wrote frequency list to {}", path.display());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    freq::report(&words, args.min_count, args.details, &mut out)?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()>
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    run(&args)
}
