//! csv io : edge list and dense feature reading, dump of an embedding.
//!
//! Edge lists and dense feature files have a header line. The delimiter is found by trying
//! comma, tab and space in turn.

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::path::Path;

use anyhow::anyhow;
use csv::{ReaderBuilder, WriterBuilder};

use ndarray::Array2;

use crate::embedding::{EmbeddedT, Embedding};

const DELIMITERS: [u8; 3] = [b',', b'\t', b' '];

fn open_csv_reader(filepath: &Path, delim: u8) -> anyhow::Result<csv::Reader<std::fs::File>> {
    let file = match OpenOptions::new().read(true).open(filepath) {
        Ok(file) => file,
        Err(e) => {
            log::error!("could not open file {:?}", filepath.as_os_str());
            return Err(anyhow!("could not open file {:?} : {}", filepath.as_os_str(), e));
        }
    };
    let rdr = ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(file);
    Ok(rdr)
} // end of open_csv_reader

// number of fields the header line splits into with delimiter delim
fn header_width(filepath: &Path, delim: u8) -> anyhow::Result<usize> {
    let mut rdr = open_csv_reader(filepath, delim)?;
    Ok(rdr.headers()?.len())
} // end of header_width

fn parse_field<T: std::str::FromStr>(field: Option<&str>, nb_record: usize, column: usize) -> anyhow::Result<T> {
    let field = field.ok_or_else(|| anyhow!("record {} has no column {}", nb_record, column))?;
    field
        .parse::<T>()
        .map_err(|_| anyhow!("record {}, column {} : cannot parse {:?}", nb_record, column, field))
} // end of parse_field

/// reads an edge list with a header line. Each record has (at least) two node ids, extra columns are ignored.
pub fn read_edge_list_with_delimiter(filepath: &Path, delim: u8) -> anyhow::Result<Vec<(usize, usize)>> {
    let mut rdr = open_csv_reader(filepath, delim)?;
    let mut edges = Vec::<(usize, usize)>::with_capacity(100_000);
    for (nb_record, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() < 2 {
            return Err(anyhow!("record {} has less than 2 fields", nb_record));
        }
        let i: usize = parse_field(record.get(0), nb_record, 0)?;
        let j: usize = parse_field(record.get(1), nb_record, 1)?;
        edges.push((i, j));
    }
    log::info!("read_edge_list : read {} edges from {:?}", edges.len(), filepath);
    Ok(edges)
} // end of read_edge_list_with_delimiter

/// reads an edge list with a header line, trying delimiters comma, tab and space.
pub fn read_edge_list(filepath: &Path) -> anyhow::Result<Vec<(usize, usize)>> {
    // the error reported is the one of the first delimiter splitting the header in at least 2 fields
    let mut first_err: Option<anyhow::Error> = None;
    let mut last_err = anyhow!("no delimiter tried");
    for delim in DELIMITERS {
        log::debug!("read_edge_list trying reading {:?} with delimiter {}", filepath, delim);
        let splits_header = header_width(filepath, delim).map(|w| w >= 2).unwrap_or(false);
        match read_edge_list_with_delimiter(filepath, delim) {
            Ok(edges) => {
                return Ok(edges);
            }
            Err(e) => {
                log::debug!("read_edge_list delimiter {} failed : {}", delim, e);
                if splits_header && first_err.is_none() {
                    first_err = Some(e);
                } else {
                    last_err = e;
                }
            }
        }
    }
    log::error!("read_edge_list failed reading {:?}", filepath);
    Err(first_err.unwrap_or(last_err))
} // end of read_edge_list

/// reads a dense feature file with a header line. The first column (node id) is discarded,
/// row i of the returned array is the i-th record of the file.
pub fn read_dense_features_with_delimiter(filepath: &Path, delim: u8) -> anyhow::Result<Array2<f64>> {
    let mut rdr = open_csv_reader(filepath, delim)?;
    let mut values = Vec::<f64>::new();
    let mut nb_cols: Option<usize> = None;
    let mut nb_rows = 0usize;
    for (nb_record, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() < 2 {
            return Err(anyhow!("record {} has no feature column", nb_record));
        }
        let row_len = record.len() - 1;
        match nb_cols {
            None => nb_cols = Some(row_len),
            Some(n) if n != row_len => {
                return Err(anyhow!("record {} has {} features, expected {}", nb_record, row_len, n));
            }
            _ => {}
        }
        for column in 1..record.len() {
            values.push(parse_field::<f64>(record.get(column), nb_record, column)?);
        }
        nb_rows += 1;
    }
    let nb_cols = nb_cols.ok_or_else(|| anyhow!("no feature record in {:?}", filepath))?;
    let features = Array2::from_shape_vec((nb_rows, nb_cols), values)?;
    log::info!("read_dense_features : features shape {:?}", features.dim());
    Ok(features)
} // end of read_dense_features_with_delimiter

/// reads a dense feature file with a header line, trying delimiters comma, tab and space.
pub fn read_dense_features(filepath: &Path) -> anyhow::Result<Array2<f64>> {
    let mut first_err: Option<anyhow::Error> = None;
    let mut last_err = anyhow!("no delimiter tried");
    for delim in DELIMITERS {
        let splits_header = header_width(filepath, delim).map(|w| w >= 2).unwrap_or(false);
        match read_dense_features_with_delimiter(filepath, delim) {
            Ok(features) => {
                return Ok(features);
            }
            Err(e) => {
                log::debug!("read_dense_features delimiter {} failed : {}", delim, e);
                if splits_header && first_err.is_none() {
                    first_err = Some(e);
                } else {
                    last_err = e;
                }
            }
        }
    }
    log::error!("read_dense_features failed reading {:?}", filepath);
    Err(first_err.unwrap_or(last_err))
} // end of read_dense_features

/// dumps an embedding in a csv file with header id,x_0,...,x_{d-1}. One record by node, in rank order,
/// the first field being the node id.
pub fn write_embedding_csv<F, NodeId, EmbeddedData>(
    embedding: &Embedding<F, NodeId, EmbeddedData>,
    filepath: &Path,
) -> anyhow::Result<()>
where
    NodeId: std::hash::Hash + std::cmp::Eq + Display,
    EmbeddedData: EmbeddedT<F>,
    F: Display,
{
    let file = match OpenOptions::new().write(true).create(true).truncate(true).open(filepath) {
        Ok(file) => file,
        Err(e) => {
            log::error!("write_embedding_csv could not open file {:?}", filepath.as_os_str());
            return Err(anyhow!("could not open file {:?} : {}", filepath.as_os_str(), e));
        }
    };
    let mut wtr = WriterBuilder::new().delimiter(b',').from_writer(BufWriter::new(file));
    let embedded = embedding.get_embedded_data();
    let dim = embedded.get_dimension();
    let mut header = Vec::<String>::with_capacity(dim + 1);
    header.push(String::from("id"));
    for j in 0..dim {
        header.push(format!("x_{}", j));
    }
    wtr.write_record(&header)?;
    let indexation = embedding.get_node_indexation();
    for rank in 0..embedded.get_nb_nodes() {
        let node_id = indexation
            .get_index(rank)
            .ok_or_else(|| anyhow!("no node id for rank {}", rank))?;
        let mut record = Vec::<String>::with_capacity(dim + 1);
        record.push(node_id.to_string());
        for x in embedded.get_embedded_node(rank).iter() {
            record.push(x.to_string());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    log::info!("embedding dumped in csv file {:?}, {} nodes", filepath, embedded.get_nb_nodes());
    Ok(())
} // end of write_embedding_csv

//===============================================================

#[cfg(test)]
mod tests {

    use super::*;

    use std::io::Write;

    use ndarray::array;

    use crate::embedding::{identity_indexation, Embedded, EmbedderT};

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn write_tmp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_edge_list() {
        log_init_test();
        let path = write_tmp("banembed_edges_comma.csv", "id_1,id_2\n0,1\n1,2\n2,0\n3,3\n");
        let edges = read_edge_list(&path).unwrap();
        assert_eq!(edges, vec![(0, 1), (1, 2), (2, 0), (3, 3)]);
        //
        let path = write_tmp("banembed_edges_tab.txt", "node_1\tnode_2\n5\t1\n1\t2\n");
        let edges = read_edge_list(&path).unwrap();
        assert_eq!(edges, vec![(5, 1), (1, 2)]);
    } // end of test_read_edge_list

    #[test]
    fn test_read_edge_list_bad() {
        log_init_test();
        let path = write_tmp("banembed_edges_bad.csv", "id_1,id_2\n0,a\n");
        assert!(read_edge_list(&path).is_err());
        let path = std::env::temp_dir().join("banembed_no_such_file.csv");
        assert!(read_edge_list(&path).is_err());
    }

    #[test]
    fn test_read_edge_list_reports_parse_error() {
        log_init_test();
        let path = write_tmp("banembed_edges_bad_record.csv", "id_1,id_2\n0,1\n1,2\n2,x\n");
        let err = read_edge_list(&path).unwrap_err().to_string();
        log::debug!("read_edge_list error : {}", err);
        assert!(err.contains("record 2, column 1"));
        assert!(err.contains("cannot parse"));
        //
        let path = write_tmp("banembed_dense_bad_record.csv", "id,f_0,f_1\n0,1,2\n1,y,0\n");
        let err = read_dense_features(&path).unwrap_err().to_string();
        assert!(err.contains("record 1, column 1"));
    } // end of test_read_edge_list_reports_parse_error

    #[test]
    fn test_read_dense_features() {
        log_init_test();
        let path = write_tmp(
            "banembed_dense_features.csv",
            "id,f_0,f_1,f_2\n0,1.,0.,2.\n1,0,1,0.5\n2,3,1,0\n",
        );
        let features = read_dense_features(&path).unwrap();
        assert_eq!(features, array![[1., 0., 2.], [0., 1., 0.5], [3., 1., 0.]]);
    } // end of test_read_dense_features

    struct FixedEmbedder;

    impl EmbedderT<i8> for FixedEmbedder {
        type Output = Embedded<i8>;
        fn embed(&mut self) -> Result<Embedded<i8>, anyhow::Error> {
            Ok(Embedded::new(
                array![[1i8, -1], [-1, -1], [1, 1]],
                crate::embed::tools::hamming::hamming_distance::<i8>,
            ))
        }
    }

    #[test]
    fn test_write_embedding_csv() {
        log_init_test();
        let embedding = Embedding::new(identity_indexation(3), &mut FixedEmbedder).unwrap();
        let path = std::env::temp_dir().join("banembed_write_embedding.csv");
        write_embedding_csv(&embedding, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id,x_0,x_1\n0,1,-1\n1,-1,-1\n2,1,1\n");
    } // end of test_write_embedding_csv
} // end of mod tests
