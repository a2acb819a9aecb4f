//! Reading of node attributes.
//!
//! - sparse mode : a json object mapping each node id to the list of its attribute ids,
//!   for example `{"0": [3, 17], "1": [2]}`. Each (node, attribute) pair has weight 1.
//!   Ids can be given as json integers or strings holding integers.
//! - dense mode : a csv file with header, first column is a node id and is discarded. See [read_dense_features](super::csv::read_dense_features)
//!
//! In both modes row i of the feature matrix is node i.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use anyhow::anyhow;
use serde_json::Value;

use sprs::{CsMat, TriMatI};

use annembed::tools::svdapprox::MatRepr;

use super::csv::read_dense_features;

/// storage of the feature matrix
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FeatureMode {
    /// json file giving for each node its attributes, stored as csr matrix
    Sparse,
    /// csv file, stored as a dense array
    Dense,
}

impl FromStr for FeatureMode {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sparse" => Ok(FeatureMode::Sparse),
            "dense" => Ok(FeatureMode::Dense),
            _ => Err(anyhow!("feature mode must be sparse or dense, got {}", s)),
        }
    }
} // end of impl FromStr for FeatureMode

fn json_to_id(value: &Value) -> anyhow::Result<usize> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| anyhow!("id {} is not a non negative integer", n)),
        Value::String(s) => s
            .trim()
            .parse::<usize>()
            .map_err(|_| anyhow!("id {:?} is not a non negative integer", s)),
        _ => Err(anyhow!("unexpected json value for an id : {}", value)),
    }
} // end of json_to_id

/// reads sparse features from a json file. Returns a csr matrix of shape (max node id + 1, max attribute id + 1)
pub fn read_sparse_features(filepath: &Path) -> anyhow::Result<CsMat<f64>> {
    let file = match OpenOptions::new().read(true).open(filepath) {
        Ok(file) => file,
        Err(e) => {
            log::error!("read_sparse_features could not open file {:?}", filepath.as_os_str());
            return Err(anyhow!("could not open file {:?} : {}", filepath.as_os_str(), e));
        }
    };
    let json: HashMap<String, Value> = match serde_json::from_reader(BufReader::new(file)) {
        Ok(json) => json,
        Err(e) => {
            log::error!("read_sparse_features could not decode json in {:?}", filepath.as_os_str());
            return Err(anyhow!("json decoding of {:?} failed : {}", filepath.as_os_str(), e));
        }
    };
    sparse_features_from_map(&json)
} // end of read_sparse_features

pub(crate) fn sparse_features_from_map(json: &HashMap<String, Value>) -> anyhow::Result<CsMat<f64>> {
    let mut rows = Vec::<usize>::new();
    let mut cols = Vec::<usize>::new();
    let mut nb_nodes = 0usize;
    let mut nb_features = 0usize;
    for (key, value) in json.iter() {
        let node = key
            .trim()
            .parse::<usize>()
            .map_err(|_| anyhow!("node id {:?} is not a non negative integer", key))?;
        nb_nodes = nb_nodes.max(node + 1);
        let attributes = value
            .as_array()
            .ok_or_else(|| anyhow!("attributes of node {} are not a list", node))?;
        for attribute in attributes {
            let feature = json_to_id(attribute)?;
            nb_features = nb_features.max(feature + 1);
            rows.push(node);
            cols.push(feature);
        }
    }
    if rows.is_empty() {
        return Err(anyhow!("no feature found"));
    }
    let values = vec![1.; rows.len()];
    // duplicated pairs are summed by the conversion to csr
    let trimat = TriMatI::<f64, usize>::from_triplets((nb_nodes, nb_features), rows, cols, values);
    let csr: CsMat<f64> = trimat.to_csr();
    log::info!(
        "sparse features : nb nodes {}, nb features {}, nnz {}",
        nb_nodes,
        nb_features,
        csr.nnz()
    );
    Ok(csr)
} // end of sparse_features_from_map

/// reads features in the requested mode.
pub fn read_features(filepath: &Path, mode: FeatureMode) -> anyhow::Result<MatRepr<f64>> {
    log::info!("reading features from {:?}, mode : {:?}", filepath, mode);
    let features = match mode {
        FeatureMode::Sparse => MatRepr::from_csrmat(read_sparse_features(filepath)?),
        FeatureMode::Dense => MatRepr::from_array2(read_dense_features(filepath)?),
    };
    Ok(features)
} // end of read_features

//===============================================================

#[cfg(test)]
mod tests {

    use super::*;

    use std::io::Write;

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
    fn test_feature_mode() {
        assert_eq!("sparse".parse::<FeatureMode>().unwrap(), FeatureMode::Sparse);
        assert_eq!("dense".parse::<FeatureMode>().unwrap(), FeatureMode::Dense);
        assert!("other".parse::<FeatureMode>().is_err());
    }

    #[test]
    fn test_read_sparse_features() {
        log_init_test();
        let path = write_tmp(
            "banembed_sparse_features.json",
            r#"{"0": [0, 4], "2": ["1"], "1": [3, 0]}"#,
        );
        let csr = read_sparse_features(&path).unwrap();
        assert_eq!(csr.shape(), (3, 5));
        assert_eq!(csr.nnz(), 5);
        let dense = csr.to_dense();
        assert_eq!(dense[[0, 0]], 1.);
        assert_eq!(dense[[0, 4]], 1.);
        assert_eq!(dense[[1, 3]], 1.);
        assert_eq!(dense[[1, 0]], 1.);
        assert_eq!(dense[[2, 1]], 1.);
        assert_eq!(dense.sum(), 5.);
        //
        let features = read_features(&path, FeatureMode::Sparse).unwrap();
        assert!(features.is_csr());
        assert_eq!(features.shape()[0], 3);
    } // end of test_read_sparse_features

    #[test]
    fn test_read_sparse_features_malformed() {
        log_init_test();
        let path = write_tmp("banembed_sparse_bad.json", r#"{"0": [0, 4], "x": [1]}"#);
        assert!(read_sparse_features(&path).is_err());
        let path = write_tmp("banembed_sparse_bad2.json", r#"{"0": 3}"#);
        assert!(read_sparse_features(&path).is_err());
        let path = write_tmp("banembed_sparse_bad3.json", r#"{"0": [1, "#);
        assert!(read_sparse_features(&path).is_err());
    }

    #[test]
    fn test_read_features_dense() {
        log_init_test();
        let path = write_tmp("banembed_dense_mode.csv", "id,a,b\n0,1,2\n1,3,4\n");
        let features = read_features(&path, FeatureMode::Dense).unwrap();
        assert!(!features.is_csr());
        assert_eq!(features.shape()[0], 2);
        assert_eq!(features.shape()[1], 2);
    }
} // end of mod tests
