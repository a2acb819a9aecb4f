//! To describe dump of embedding


use std::fmt::Display;
use std::path::Path;

use serde::Serialize;

use crate::embedding::{EmbeddedT, Embedding};

/// csv is the main output, bson is an optional binary dump that can be reloaded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    CSV,
    BSON,
}

impl Format {
    /// file extension associated to format
    pub fn get_extension(&self) -> &'static str {
        match self {
            Format::CSV => "csv",
            Format::BSON => "bson",
        }
    }
} // end of impl Format

pub struct Output {
    /// describe output format
    fmt : Format,
    /// do we dump indexation? (only in bson, csv always has node ids in first column)
    indexation : bool,
    /// name of output file
    output_name : String,
}

impl Output {
    /// if output_name is None, default output_name will be "embedding.csv" or "embedding.bson".
    /// A csv output is written to output_name as given, a bson output to output_name with its extension replaced by bson.
    pub fn new(fmt : Format, indexation : bool, output_name : &Option<String>) -> Self {
        let output_name = match output_name {
            Some(name) => match fmt {
                Format::CSV => name.clone(),
                Format::BSON => Path::new(name).with_extension(fmt.get_extension()).to_string_lossy().into_owned(),
            },
            None => format!("embedding.{}", fmt.get_extension()),
        };
        Output{fmt, indexation, output_name}
    }
    /// get ouput format
    pub fn get_fmt(&self) -> Format { self.fmt}

    /// get output_name
    pub fn get_output_name(&self) -> &String { &self.output_name}

    /// get indexation
    pub fn get_indexation(&self) -> bool { self.indexation}

}  // end of Output


impl Default for Output {
    fn default() -> Self {
        Output{fmt : Format::CSV, indexation: true, output_name : String::from("embedding.csv")}
    }
}


/// dumps embedding according to output format
pub fn dump_embedding<F, NodeId, EmbeddedData>(
    embedding: &Embedding<F, NodeId, EmbeddedData>,
    output: &Output,
) -> Result<(), anyhow::Error>
where
    NodeId: std::hash::Hash + std::cmp::Eq + Display,
    EmbeddedData: EmbeddedT<F>,
    F: Serialize + Display,
{
    log::info!("dumping embedding in {:?} format, file : {}", output.get_fmt(), output.get_output_name());
    match output.get_fmt() {
        Format::CSV => super::csv::write_embedding_csv(embedding, Path::new(output.get_output_name())),
        Format::BSON => super::embeddedbson::bson_dump(embedding, output),
    }
} // end of dump_embedding


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_output_name() {
        let output = Output::new(Format::BSON, true, &Some(String::from("/tmp/cora.csv")));
        assert_eq!(output.get_output_name(), "/tmp/cora.bson");
        assert!(output.get_indexation());
        // csv keeps the name it is given
        let output = Output::new(Format::CSV, false, &Some(String::from("cora")));
        assert_eq!(output.get_output_name(), "cora");
        let output = Output::new(Format::CSV, true, &Some(String::from("./output/ptbr_bane.txt")));
        assert_eq!(output.get_output_name(), "./output/ptbr_bane.txt");
        let output = Output::new(Format::BSON, true, &Some(String::from("./out/emb.v2")));
        assert_eq!(output.get_output_name(), "./out/emb.bson");
        let output = Output::new(Format::BSON, false, &None);
        assert_eq!(output.get_output_name(), "embedding.bson");
        assert_eq!(Output::default().get_fmt(), Format::CSV);
    }
} // end of mod tests
