use std::fs::File;
use std::io::{BufReader, Read};
use std::iter;
use std::path::Path;

use vibrato::tokenizer::worker::Worker;
use vibrato::{Dictionary, Tokenizer};

use crate::error::Result;

/// Feature string carried by the sentence boundary nodes.
pub const BOUNDARY_FEATURE : &str = "BOS/EOS";

#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
pub struct Node {
    pub surface : Vec<u8>,
    pub feature : Vec<u8>,
}

impl Node {
    pub fn boundary() -> Node
    {
        Node { surface : Vec::new(), feature : BOUNDARY_FEATURE.as_bytes().to_vec() }
    }
    pub fn morpheme(surface : &str, feature : &str) -> Node
    {
        Node { surface : surface.as_bytes().to_vec(), feature : feature.as_bytes().to_vec() }
    }
    pub fn is_boundary(&self) -> bool
    {
        self.feature == BOUNDARY_FEATURE.as_bytes()
    }
}

pub type Nodes<'a> = Box<dyn Iterator<Item = Node> + 'a>;

/// A morphological analyzer.
///
/// Each call yields a fresh sequence for one line of text. The sequence
/// opens and closes with a boundary node, like MeCab's node lattice.
pub trait Tagger {
    fn parse_to_nodes(&mut self, text : &str) -> Result<Nodes<'_>>;
}

impl<'t> Tagger for Worker<'t> {
    fn parse_to_nodes(&mut self, text : &str) -> Result<Nodes<'_>>
    {
        self.reset_sentence(text);
        self.tokenize();

        let worker = &*self;
        let morphemes = (0..worker.num_tokens()).map(move |i|
        {
            let token = worker.token(i);
            Node::morpheme(token.surface(), token.feature())
        });
        Ok(Box::new(iter::once(Node::boundary()).chain(morphemes).chain(iter::once(Node::boundary()))))
    }
}

/// Loads a compiled vibrato system dictionary, zstd-compressed when the
/// file name ends in `.zst`.
pub fn load_tokenizer(path : &Path) -> Result<Tokenizer>
{
    log::info!("loading dictionary from {}", path.display());
    let file = BufReader::new(File::open(path)?);
    let reader : Box<dyn Read> = if path.extension().map_or(false, |ext| ext == "zst")
    {
        Box::new(zstd::stream::read::Decoder::new(file)?)
    }
    else
    {
        Box::new(file)
    };
    let dict = Dictionary::read(reader)?;
    log::info!("dictionary loaded");
    Ok(Tokenizer::new(dict))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_nodes_are_recognized()
    {
        assert!(Node::boundary().is_boundary());
        assert!(!Node::morpheme("猫", "名詞,一般,*,*,*,*,猫,ネコ,ネコ").is_boundary());
        assert!(!Node::morpheme("BOS/EOS", "名詞,固有名詞").is_boundary());
    }

    // needs a compiled dictionary placed in data/ manually
    #[test]
    #[ignore]
    fn vibrato_nodes_are_wrapped_in_boundaries()
    {
        let tokenizer = load_tokenizer(Path::new("data/system.dic.zst")).unwrap();
        let mut worker = tokenizer.new_worker();
        let nodes = worker.parse_to_nodes("猫が好き").unwrap().collect::<Vec<_>>();
        assert!(nodes.len() > 2);
        assert!(nodes.first().unwrap().is_boundary());
        assert!(nodes.last().unwrap().is_boundary());
        assert!(nodes[1..nodes.len() - 1].iter().all(|node| !node.is_boundary()));
    }
}
