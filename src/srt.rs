use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use encoding_rs::Encoding;
use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};
use regex::Regex;

use crate::error::{Error, Result};

#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(Default)]
#[derive(PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    pub millis : u64,
}

impl Timestamp {
    /// `None` when the total does not fit in milliseconds.
    pub fn from_parts(hours : u64, minutes : u64, seconds : u64, millis : u64) -> Option<Timestamp>
    {
        let millis = hours.checked_mul(60)?
            .checked_add(minutes)?.checked_mul(60)?
            .checked_add(seconds)?.checked_mul(1000)?
            .checked_add(millis)?;
        Some(Timestamp { millis })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f : &mut fmt::Formatter) -> fmt::Result
    {
        let seconds = self.millis / 1000;
        write!(f, "{:02}:{:02}:{:02},{:03}", seconds / 3600, seconds / 60 % 60, seconds % 60, self.millis % 1000)
    }
}

impl FromStr for Timestamp {
    type Err = String;
    // HH:MM:SS,mmm (a '.' before the milliseconds is accepted too)
    fn from_str(text : &str) -> std::result::Result<Timestamp, String>
    {
        let bad = || format!("bad timestamp `{}`", text);
        let (clock, millis) = match text.trim().rfind(|c : char| c == ',' || c == '.')
        {
            Some(split) => (&text.trim()[..split], &text.trim()[split+1..]),
            None => return Err(bad())
        };
        let mut fields = clock.split(':').map(|x| x.parse::<u64>());
        match (fields.next(), fields.next(), fields.next(), fields.next(), millis.parse::<u64>())
        {
            (Some(Ok(h)), Some(Ok(m)), Some(Ok(s)), None, Ok(ms)) if m < 60 && s < 60 && ms < 1000 => Timestamp::from_parts(h, m, s, ms).ok_or_else(bad),
            _ => Err(bad())
        }
    }
}

#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
pub struct SrtItem {
    pub index : u32,
    pub text : Vec<String>,
    pub start_time : Timestamp,
    pub end_time : Timestamp,
}

impl SrtItem {
    /// Text lines joined the way they are stored, one trailing newline each.
    pub fn content(&self) -> String
    {
        let mut content = String::new();
        for line in &self.text
        {
            content += line;
            content += "\n";
        }
        content
    }
}

/// Reads SRT blocks lazily, in file order.
pub struct SrtReader<R : BufRead> {
    lines : io::Lines<R>,
    line_number : usize,
    timing_regex : Regex,
    done : bool,
}

pub type DecodedSrtReader<R> = SrtReader<BufReader<DecodeReaderBytes<R, Vec<u8>>>>;

/// Opens an SRT file. Without an explicit encoding the text is taken as
/// UTF-8, or as whatever encoding its byte order mark names.
pub fn parse_srt(path : &Path, encoding : Option<&'static Encoding>) -> Result<DecodedSrtReader<File>>
{
    Ok(SrtReader::decoding(File::open(path)?, encoding))
}

impl<R : Read> SrtReader<BufReader<DecodeReaderBytes<R, Vec<u8>>>> {
    pub fn decoding(reader : R, encoding : Option<&'static Encoding>) -> DecodedSrtReader<R>
    {
        let decoder = DecodeReaderBytesBuilder::new().encoding(encoding).build(reader);
        SrtReader::new(BufReader::new(decoder))
    }
}

impl<R : BufRead> SrtReader<R> {
    pub fn new(reader : R) -> SrtReader<R>
    {
        SrtReader {
            lines : reader.lines(),
            line_number : 0,
            timing_regex : Regex::new(r"^\s*(\S+)\s*-->\s*(\S+)").unwrap(),
            done : false,
        }
    }
    fn next_line(&mut self) -> Result<Option<String>>
    {
        match self.lines.next()
        {
            Some(line) =>
            {
                let mut line = line?;
                self.line_number += 1;
                if self.line_number == 1 && line.starts_with('\u{feff}')
                {
                    line.remove(0);
                }
                if line.ends_with('\r')
                {
                    line.pop();
                }
                Ok(Some(line))
            }
            None => Ok(None)
        }
    }
    fn read_item(&mut self) -> Result<Option<SrtItem>>
    {
        let index_line = loop
        {
            match self.next_line()?
            {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line,
                None => return Ok(None)
            }
        };
        let index = index_line.trim().parse::<u32>().map_err(|_| Error::subtitle(self.line_number, format!("expected item index, got `{}`", index_line)))?;

        let timing_line = self.next_line()?.ok_or_else(|| Error::subtitle(self.line_number, "unexpected end of file after item index"))?;
        let (start_time, end_time) = match self.timing_regex.captures(&timing_line)
        {
            Some(captures) =>
            {
                let start = captures[1].parse::<Timestamp>().map_err(|err| Error::subtitle(self.line_number, err))?;
                let end = captures[2].parse::<Timestamp>().map_err(|err| Error::subtitle(self.line_number, err))?;
                (start, end)
            }
            None => return Err(Error::subtitle(self.line_number, format!("expected timing line, got `{}`", timing_line)))
        };

        let mut text = Vec::new();
        while let Some(line) = self.next_line()?
        {
            if line.trim().is_empty()
            {
                break;
            }
            text.push(line);
        }
        Ok(Some(SrtItem { index, text, start_time, end_time }))
    }
}

impl<R : BufRead> Iterator for SrtReader<R> {
    type Item = Result<SrtItem>;
    fn next(&mut self) -> Option<Result<SrtItem>>
    {
        if self.done
        {
            return None;
        }
        match self.read_item()
        {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) =>
            {
                self.done = true;
                None
            }
            Err(err) =>
            {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn read_all(text : &str) -> Vec<SrtItem>
    {
        SrtReader::new(Cursor::new(text.as_bytes().to_vec())).map(|item| item.unwrap()).collect()
    }

    #[test]
    fn timestamps_round_trip_through_text()
    {
        let stamp = "01:02:03,004".parse::<Timestamp>().unwrap();
        assert_eq!(Some(stamp), Timestamp::from_parts(1, 2, 3, 4));
        assert_eq!(stamp.millis, 3_723_004);
        assert_eq!(stamp.to_string(), "01:02:03,004");
        assert_eq!("00:00:01.500".parse::<Timestamp>().unwrap().millis, 1500);
        assert!("00:61:00,000".parse::<Timestamp>().is_err());
        assert!("00:00:00".parse::<Timestamp>().is_err());
        assert!("aa:00:00,000".parse::<Timestamp>().is_err());
    }

    #[test]
    fn oversized_hours_are_rejected()
    {
        assert!("300000000000000000:00:00,000".parse::<Timestamp>().is_err());
        assert!(Timestamp::from_parts(u64::MAX, 0, 0, 0).is_none());
        assert!(Timestamp::from_parts(0, 0, 0, u64::MAX).is_none());

        let mut reader = SrtReader::new(Cursor::new(b"1\n300000000000000000:00:00,000 --> 00:00:01,000\ntext\n".to_vec()));
        assert!(matches!(reader.next(), Some(Err(Error::Subtitle { line : 2, .. }))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn reads_items_in_file_order()
    {
        let items = read_all("1\n00:00:01,000 --> 00:00:02,500\n猫が好き\n\n2\n00:00:03,000 --> 00:00:04,000\n日本語の行\n中文行\n\n");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].index, 1);
        assert_eq!(items[0].text, vec!["猫が好き"]);
        assert_eq!(items[0].start_time.millis, 1000);
        assert_eq!(items[0].end_time.millis, 2500);
        assert_eq!(items[1].index, 2);
        assert_eq!(items[1].text, vec!["日本語の行", "中文行"]);
        assert_eq!(items[1].content(), "日本語の行\n中文行\n");
    }

    #[test]
    fn tolerates_crlf_bom_and_missing_trailing_blank()
    {
        let items = read_all("\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nこんにちは\r\n\r\n\r\n2\r\n00:00:02,000 --> 00:00:03,000\r\nさようなら");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].index, 1);
        assert_eq!(items[0].text, vec!["こんにちは"]);
        assert_eq!(items[1].text, vec!["さようなら"]);
    }

    #[test]
    fn item_without_text()
    {
        let items = read_all("7\n00:00:01,000 --> 00:00:02,000\n\n");
        assert_eq!(items.len(), 1);
        assert!(items[0].text.is_empty());
        assert_eq!(items[0].content(), "");
    }

    #[test]
    fn malformed_timing_stops_the_reader()
    {
        let mut reader = SrtReader::new(Cursor::new(b"1\nnot a timing line\ntext\n\n2\n00:00:01,000 --> 00:00:02,000\nok\n".to_vec()));
        match reader.next()
        {
            Some(Err(Error::Subtitle { line, .. })) => assert_eq!(line, 2),
            other => panic!("expected subtitle error, got {:?}", other)
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn malformed_index()
    {
        let mut reader = SrtReader::new(Cursor::new(b"one\n00:00:01,000 --> 00:00:02,000\n".to_vec()));
        assert!(matches!(reader.next(), Some(Err(Error::Subtitle { line : 1, .. }))));
    }

    #[test]
    fn decodes_legacy_encodings()
    {
        let text = "1\n00:00:01,000 --> 00:00:02,000\n日本語の字幕\n\n";
        let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(text);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();
        file.flush().unwrap();

        let items = parse_srt(file.path(), Some(encoding_rs::SHIFT_JIS)).unwrap().map(|item| item.unwrap()).collect::<Vec<_>>();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, vec!["日本語の字幕"]);
    }

    #[test]
    fn undeclared_utf8_passes_through()
    {
        let text = "1\n00:00:01,000 --> 00:00:02,000\n日本語\n";
        let items = SrtReader::decoding(Cursor::new(text.as_bytes().to_vec()), None).map(|item| item.unwrap()).collect::<Vec<_>>();
        assert_eq!(items[0].text, vec!["日本語"]);
    }
}
