use std::str;

// lemma markers the dictionary uses for tokens that are not real entries
const NON_WORD_LEMMAS : [&str; 2] = ["*", "\u{3000}"];

const WORD_CLASS_FIELD : usize = 0;
const LEMMA_FIELD : usize = 6;
const SPELLING_FIELD : usize = 7;

#[derive(Clone)]
#[derive(Debug)]
#[derive(Default)]
#[derive(PartialEq)]
pub struct WordOccurrenceInfo {
    pub surface_form : String,
    pub dictionary_form : String,
    pub word_class : String,
    pub spelling : String,
    pub features : Vec<String>,
}

/// Builds a word record out of one tokenizer node.
///
/// Returns `None` when either string is not valid UTF-8 or when the lemma
/// field holds one of the dictionary's non-word markers. Rows too short to
/// carry a lemma are kept with an empty `dictionary_form`.
pub fn parse_feature(surface : &[u8], feature : &[u8]) -> Option<WordOccurrenceInfo>
{
    let surface = str::from_utf8(surface).ok()?;
    let feature = str::from_utf8(feature).ok()?;

    let features = feature.split(',').map(|x| x.to_string()).collect::<Vec<_>>();

    let mut info = WordOccurrenceInfo::default();
    info.surface_form = surface.to_string();
    info.word_class = features[WORD_CLASS_FIELD].clone();
    if features.len() > LEMMA_FIELD
    {
        if NON_WORD_LEMMAS.contains(&features[LEMMA_FIELD].as_str())
        {
            return None;
        }
        info.dictionary_form = features[LEMMA_FIELD].clone();
    }
    if features.len() > SPELLING_FIELD
    {
        info.spelling = features[SPELLING_FIELD].clone();
    }
    info.features = features;
    Some(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lemma_class_and_spelling()
    {
        let word = parse_feature("食べ".as_bytes(), "動詞,自立,*,*,一段,連用形,食べる,タベ,タベ".as_bytes()).unwrap();
        assert_eq!(word.surface_form, "食べ");
        assert_eq!(word.dictionary_form, "食べる");
        assert_eq!(word.word_class, "動詞");
        assert_eq!(word.spelling, "タベ");
        assert_eq!(word.features.len(), 9);
        assert_eq!(word.features[4], "一段");
    }

    #[test]
    fn lemma_without_spelling()
    {
        let word = parse_feature("猫".as_bytes(), "名詞,一般,*,*,*,*,猫".as_bytes()).unwrap();
        assert_eq!(word.dictionary_form, "猫");
        assert_eq!(word.spelling, "");
        assert_eq!(word.features.len(), 7);
    }

    #[test]
    fn non_word_markers_are_discarded()
    {
        assert_eq!(parse_feature("ｗ".as_bytes(), "名詞,一般,*,*,*,*,*".as_bytes()), None);
        assert_eq!(parse_feature("\u{3000}".as_bytes(), "記号,空白,*,*,*,*,\u{3000},\u{3000},\u{3000}".as_bytes()), None);
    }

    #[test]
    fn short_rows_keep_an_empty_lemma()
    {
        let word = parse_feature("が".as_bytes(), "助詞,格助詞,一般".as_bytes()).unwrap();
        assert_eq!(word.dictionary_form, "");
        assert_eq!(word.word_class, "助詞");
        assert_eq!(word.features, vec!["助詞", "格助詞", "一般"]);
    }

    #[test]
    fn invalid_utf8_is_skipped()
    {
        assert_eq!(parse_feature(&[0xe7, 0x8c], "名詞,一般,*,*,*,*,猫".as_bytes()), None);
        assert_eq!(parse_feature("猫".as_bytes(), &[0x90, 0x2c, 0x41]), None);
    }

    #[test]
    fn empty_feature_string()
    {
        let word = parse_feature(b"x", b"").unwrap();
        assert_eq!(word.word_class, "");
        assert_eq!(word.dictionary_form, "");
    }
}
