use std::collections::HashMap;
use std::io::{self, Write};

use uuid::Uuid;

use crate::error::Result;
use crate::sink::WordSink;
use crate::word::WordOccurrenceInfo;

pub fn new_id() -> String
{
    Uuid::new_v4().to_string()
}

#[derive(Clone)]
#[derive(Debug)]
pub struct WordEntry {
    pub count : u64,
    pub id : String,
    pub surfaces : HashMap<String, u64>,
}

impl WordEntry {
    fn blank() -> WordEntry
    {
        WordEntry { count : 0, id : new_id(), surfaces : HashMap::new() }
    }
    /// Most frequent surface form seen for this lemma.
    pub fn exact_form(&self) -> &str
    {
        let mut best : Option<(&String, u64)> = None;
        for (surface, count) in &self.surfaces
        {
            best = match best
            {
                Some((best_surface, best_count)) if best_count > *count || (best_count == *count && best_surface <= surface) => best,
                _ => Some((surface, *count))
            };
        }
        best.map_or("", |(surface, _)| surface.as_str())
    }
}

/// Occurrence counts keyed by dictionary form, iterated in first-seen order.
#[derive(Clone)]
#[derive(Debug)]
#[derive(Default)]
pub struct FrequencyMap {
    entries : Vec<(String, WordEntry)>,
    index : HashMap<String, usize>,
}

impl FrequencyMap {
    pub fn new() -> FrequencyMap
    {
        FrequencyMap::default()
    }
    /// Counts one occurrence and returns the lemma's id.
    pub fn record(&mut self, word : &WordOccurrenceInfo) -> &str
    {
        let slot = match self.index.get(&word.dictionary_form)
        {
            Some(slot) => *slot,
            None =>
            {
                self.entries.push((word.dictionary_form.clone(), WordEntry::blank()));
                self.index.insert(word.dictionary_form.clone(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        let entry = &mut self.entries[slot].1;
        entry.count += 1;
        *entry.surfaces.entry(word.surface_form.clone()).or_insert(0) += 1;
        &entry.id
    }
    pub fn get(&self, dictionary_form : &str) -> Option<&WordEntry>
    {
        self.index.get(dictionary_form).map(|slot| &self.entries[*slot].1)
    }
    pub fn len(&self) -> usize
    {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WordEntry)>
    {
        self.entries.iter().map(|(form, entry)| (form.as_str(), entry))
    }
}

/// Words by descending count; equal counts keep first-seen order.
pub fn sorted_words(words : &FrequencyMap) -> Vec<(&str, &WordEntry)>
{
    let mut sorted = words.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| b.1.count.cmp(&a.1.count));
    sorted
}

#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(Default)]
#[derive(PartialEq, Eq)]
pub struct FrequencySummary {
    pub total : u64,
    pub distinct : u64,
    pub total_valid : u64,
    pub distinct_valid : u64,
}

pub fn summarize(words : &FrequencyMap, min_count : u64) -> FrequencySummary
{
    let mut summary = FrequencySummary::default();
    for (_, entry) in words.iter()
    {
        summary.total += entry.count;
        summary.distinct += 1;
        if entry.count >= min_count
        {
            summary.total_valid += entry.count;
            summary.distinct_valid += 1;
        }
    }
    summary
}

pub fn report<W : Write>(words : &FrequencyMap, min_count : u64, print_details : bool, out : &mut W) -> io::Result<()>
{
    let summary = summarize(words, min_count);
    writeln!(out, "Total word count:{}", summary.total)?;
    writeln!(out, "Distinct word count:{}", summary.distinct)?;
    writeln!(out, "Total word count (occurred at least {} time(s)):{}", min_count, summary.total_valid)?;
    writeln!(out, "Distinct word count (occurred at least {} time(s)):{}", min_count, summary.distinct_valid)?;

    if print_details
    {
        for (form, entry) in sorted_words(words)
        {
            if entry.count >= min_count
            {
                writeln!(out, "{},{}", form, entry.count)?;
            }
        }
    }
    Ok(())
}

/// Writes `dictionary_form,exact_form,count` rows in report order.
pub fn write_csv<W : Write>(words : &FrequencyMap, min_count : u64, writer : W) -> Result<()>
{
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(&["dictionary_form", "exact_form", "count"])?;
    for (form, entry) in sorted_words(words)
    {
        if entry.count >= min_count
        {
            writer.write_record(&[form, entry.exact_form(), entry.count.to_string().as_str()])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes one words row per lemma, keyed by the id assigned when it was first seen.
pub fn store_words(words : &FrequencyMap, sink : &mut dyn WordSink) -> Result<()>
{
    for (form, entry) in words.iter()
    {
        sink.insert_word(&entry.id, form, entry.exact_form(), entry.count)?;
    }
    Ok(())
}
