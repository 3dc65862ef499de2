use std::io::Read;
use std::path::Path;

use encoding_rs::Encoding;

use crate::error::Result;
use crate::freq::FrequencyMap;
use crate::sink::WordSink;
use crate::srt::{parse_srt, SrtItem, SrtReader};
use crate::tagger::Tagger;
use crate::word::parse_feature;

#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(PartialEq, Eq)]
pub enum LoadMode {
    FullText,
    // dual-language subtitles: Japanese line first, translation after
    FirstLineOnly,
}

#[derive(Clone, Copy)]
#[derive(Debug)]
pub struct LoadOptions {
    pub mode : LoadMode,
    pub encoding : Option<&'static Encoding>,
    pub link_words : bool,
}

impl Default for LoadOptions {
    fn default() -> LoadOptions
    {
        LoadOptions { mode : LoadMode::FullText, encoding : None, link_words : false }
    }
}

/// Tokenizes every text line of one item and counts its words.
///
/// Returns the id the sink gave the item.
pub fn process_srt_item(sink : &mut dyn WordSink, item : &SrtItem, file_id : &str, tagger : &mut dyn Tagger, words : &mut FrequencyMap, link_words : bool) -> Result<String>
{
    let item_id = sink.insert_srt_item(item, file_id)?;
    for text in &item.text
    {
        for node in tagger.parse_to_nodes(text)?
        {
            if node.is_boundary()
            {
                continue;
            }
            if let Some(word) = parse_feature(&node.surface, &node.feature)
            {
                let word_id = words.record(&word);
                if link_words
                {
                    sink.insert_word_item_mapping(word_id, &item_id)?;
                }
            }
        }
    }
    Ok(item_id)
}

pub fn load_subtitle(sink : &mut dyn WordSink, path : &Path, options : &LoadOptions, tagger : &mut dyn Tagger, words : &mut FrequencyMap) -> Result<()>
{
    let items = parse_srt(path, options.encoding)?;
    load_items(sink, &path.to_string_lossy(), items, options, tagger, words)
}

/// Same as `load_subtitle`, for SRT text that does not come from a file.
pub fn load_subtitle_from_reader<R : Read>(sink : &mut dyn WordSink, name : &str, reader : R, options : &LoadOptions, tagger : &mut dyn Tagger, words : &mut FrequencyMap) -> Result<()>
{
    load_items(sink, name, SrtReader::decoding(reader, options.encoding), options, tagger, words)
}

fn load_items<I>(sink : &mut dyn WordSink, name : &str, items : I, options : &LoadOptions, tagger : &mut dyn Tagger, words : &mut FrequencyMap) -> Result<()>
    where I : Iterator<Item = Result<SrtItem>>
{
    let file_id = sink.insert_file(name)?;
    let mut count = 0;
    for item in items
    {
        let mut item = item?;
        if options.mode == LoadMode::FirstLineOnly
        {
            item.text.truncate(1);
        }
        log::debug!("item {} ({} -> {})", item.index, item.start_time, item.end_time);
        process_srt_item(sink, &item, &file_id, tagger, words, options.link_words)?;
        count += 1;
    }
    if count == 0
    {
        log::warn!("no subtitle items found in {}", name);
    }
    log::info!("loaded {} items from {} ({} distinct words so far)", count, name, words.len());
    Ok(())
}
