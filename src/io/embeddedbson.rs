//! module to do bson io for embedding results
//!
//!  Data are formatted in a bson Document, each value has a key.
//!
//!  The encoding is done in 3 parts:
//! 1. A header structure with key "header". The structure is described below see struct [Header](EmbeddedBsonHeader)
//! - a version index
//! - base type name, i8 for a binary embedding, encoded as a String. key is type_name.
//!   **Beware that bson stores i8 values as i32, an independant implementation of a reload
//!   will need to parse values as i32**
//! - dimension of vectors
//! - number of vectors
//!
//! 2. The embedded vectors : one document by vector, the key being the rank of the vector,
//!    so the first vector of embedding has key "0", the second "1".
//!
//! 3. The nodeindexation can also be encoded in a subdocument, the last document of the file.
//!    The dump of nodeindexation is not mandatory, for an identity indexation it can be reconstructed.
//!    If the document is present : each nodeid is encoded as string providing a key associated to the node rank as i64.
//!

// Note : a Bson document must not be larger than 16Mb!
// So we need to have many Documents in the file dumped

use anyhow::anyhow;

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use std::str::FromStr;

use bson::{bson, Bson, Document};
use serde::{Deserialize, Serialize};

use indexmap::IndexSet;
use ndarray::{Array2, ArrayView1};

use crate::embedding::*;
use crate::io::output::Output;

/// current version of dump format
const BSON_VERSION: i64 = 1;

/// This structure defines the header of the bson document
#[derive(Debug, Serialize, Deserialize)]
pub struct EmbeddedBsonHeader {
    /// version of dump format
    pub version: i64,
    /// encodes type of vectors used in the embedding.
    pub type_name: String,
    /// dimension of the embedding (length of vectors)
    pub dimension: i64,
    /// number of vectors.
    pub nbdata: i64,
} // end of EmbeddedBsonHeader

impl EmbeddedBsonHeader {
    pub fn new(type_name: String, dimension: i64, nbdata: i64) -> Self {
        EmbeddedBsonHeader {
            version: BSON_VERSION,
            type_name,
            dimension,
            nbdata,
        }
    }
} // end of impl EmbeddedBsonHeader

/// dump an embedding in bson format in the file given by output.
/// If output asks for indexation, nodeindexation will also be dumped, and retrieved from bson file.
/// The dump consists in a header document. Then each node is dumped in its document (a bson document must less than 16Mb)
/// The last document contains the indexation if dump is asked for.
pub fn bson_dump<F, NodeId, EmbeddedData>(
    embedding: &Embedding<F, NodeId, EmbeddedData>,
    output: &Output,
) -> Result<(), anyhow::Error>
where
    NodeId: std::hash::Hash + std::cmp::Eq + Display,
    EmbeddedData: EmbeddedT<F>,
    F: Serialize,
{
    //
    log::info!("entering bson_dump");
    //
    let path = Path::new(output.get_output_name());
    let file = match OpenOptions::new().write(true).create(true).truncate(true).open(path) {
        Ok(file) => file,
        Err(e) => {
            return Err(anyhow!("could not open file : {}, {}", path.display(), e));
        }
    };
    let mut bufwriter = BufWriter::new(file);
    let mut doc = Document::new();

    let embedded = embedding.get_embedded_data();
    // dump header part
    let dim = i64::try_from(embedded.get_dimension())?;
    let nbdata = i64::try_from(embedded.get_nb_nodes())?;
    // we could allocate a EmbeddedBsonHeader and call bson::to_bson but for C decoder ...
    let bson_header = bson!({
        "version": BSON_VERSION,
        "type_name": std::any::type_name::<F>(),
        "dimension": dim,
        "nbdata": nbdata
        }
    );
    doc.insert("header", bson_header);
    if let Err(e) = doc.to_writer(&mut bufwriter) {
        log::error!("dump header bson in {} failed", path.display());
        return Err(anyhow!("dump of bson failed: {}", e));
    }
    // now loop on data vectors
    for i in 0..embedded.get_nb_nodes() {
        let mut doc = Document::new();
        let data = embedded
            .get_embedded_node(i)
            .iter()
            .map(bson::to_bson)
            .collect::<Result<Vec<Bson>, _>>()?;
        doc.insert(i.to_string(), data);
        if let Err(e) = doc.to_writer(&mut bufwriter) {
            log::error!("bson dump error in node {}", i);
            return Err(anyhow!("bson dump error for node {} {}", i, e));
        }
    }
    // We dump nodeindexation as a document with
    // each key being nodeid converted to a String
    if output.get_indexation() {
        log::info!("\t dumping NodeIndexation");
        let mut bson_indexation = Document::new();
        for (rank, node_id) in embedding.get_node_indexation().iter().enumerate() {
            bson_indexation.insert(node_id.to_string(), rank as i64);
        }
        if let Err(e) = bson_indexation.to_writer(&mut bufwriter) {
            log::error!("dump of indexation in {} failed", path.display());
            return Err(anyhow!("dump of bson failed: {}", e));
        }
        log::debug!("\t NodeIndexation bson encoded");
    } // end dump indexation
    //
    log::info!("bson dump in file {} finished", path.display());
    //
    Ok(())
} // end of bson_dump

fn open_and_read_header(fname: &str) -> Result<(BufReader<std::fs::File>, EmbeddedBsonHeader), anyhow::Error> {
    let path = Path::new(fname);
    let file = match OpenOptions::new().read(true).open(path) {
        Ok(file) => file,
        Err(e) => {
            log::error!("reload of bson dump failed, could not open {}", path.display());
            return Err(anyhow!("reload failed: {}", e));
        }
    };
    let mut bufreader = BufReader::new(file);
    let doc = match Document::from_reader(&mut bufreader) {
        Ok(doc) => doc,
        Err(e) => {
            log::error!("could not load document from file {}", path.display());
            return Err(anyhow!(e));
        }
    };
    let bson_header = match doc.get("header") {
        Some(header) => header.clone(),
        None => {
            log::error!("could not load header from file {}", path.display());
            return Err(anyhow!("could not find header in document"));
        }
    };
    let header: EmbeddedBsonHeader = bson::from_bson(bson_header)?;
    Ok((bufreader, header))
} // end of open_and_read_header

/// returns the bson header of an embedding.
/// This can be useful to retrieve the type of the embedding (dumped via a call to std::any::type_name::\<F\>()).
pub fn get_bson_header(fname: &str) -> Result<EmbeddedBsonHeader, anyhow::Error> {
    log::info!("get_bson_header: trying to open file : {:?}", fname);
    let (_, header) = open_and_read_header(fname)?;
    log::info!(" bson header reloaded");
    Ok(header)
} // end of get_bson_header

/// The structure returned by bson_load.
pub struct EmbeddedBsonReload<F, NodeId> {
    /// embedded vectors, one row by node
    pub(crate) embedded: Array2<F>,
    /// If nodeindexation was dumped in bson
    pub(crate) node_indexation: Option<IndexSet<NodeId>>,
} // end of EmbeddedBsonReload

impl<F, NodeId> EmbeddedBsonReload<F, NodeId> {
    pub fn new(embedded: Array2<F>, node_indexation: Option<IndexSet<NodeId>>) -> Self {
        EmbeddedBsonReload {
            embedded,
            node_indexation,
        }
    }
    /// returns embedded data.
    pub fn get_embedded(&self) -> &Array2<F> {
        &self.embedded
    }
    /// returns node indexation if present
    pub fn get_node_indexation(&self) -> Option<&IndexSet<NodeId>> {
        self.node_indexation.as_ref()
    }
    /// consumes the reload, giving back data and indexation
    pub fn into_parts(self) -> (Array2<F>, Option<IndexSet<NodeId>>) {
        (self.embedded, self.node_indexation)
    }
} // enf of impl EmbeddedBsonReload

/// reloads embedded data from a previous bson dump and returns a EmbeddedBsonReload structure.
/// An [Embedding] can be reconstituted from it, see [from_bson_with_hamming](crate::embedding::from_bson_with_hamming)
pub fn bson_load<F, NodeId>(fname: &str) -> Result<EmbeddedBsonReload<F, NodeId>, anyhow::Error>
where
    NodeId: std::hash::Hash + std::cmp::Eq + FromStr,
    F: num_traits::Zero + Clone + serde::de::DeserializeOwned,
{
    //
    log::info!("entering bson_load, file name : {:?}", fname);
    //
    let (mut bufreader, header) = open_and_read_header(fname)?;
    log::info!("header : {:?}", header);
    if header.version != BSON_VERSION {
        log::error!("header format version : {}", header.version);
        return Err(anyhow!("format version error, inconsistent with header"));
    }
    let nb_data = usize::try_from(header.nbdata)?;
    let dim = usize::try_from(header.dimension)?;
    log::debug!("bson_load , nb_data = {}, dim : {}", nb_data, dim);
    let type_name = std::any::type_name::<F>();
    if header.type_name != type_name {
        log::error!(
            "header as type name : {}, reloading with : {}",
            header.type_name,
            type_name
        );
        return Err(anyhow!("type error, inconsistent with header"));
    }
    let mut array = Array2::<F>::zeros((0, dim));
    for i in 0..nb_data {
        // we have one document for each node
        let doc = match Document::from_reader(&mut bufreader) {
            Ok(doc) => doc,
            Err(e) => {
                log::error!("could not load document for node {} from file {}", i, fname);
                return Err(anyhow!(e));
            }
        };
        let key = i.to_string();
        let value = match doc.get(&key) {
            Some(value) => value.clone(),
            None => {
                log::error!("could not get record for key {:?}", key);
                return Err(anyhow!("could not get record for key {:?}", key));
            }
        };
        let data_1d: Vec<F> = match bson::from_bson(value) {
            Ok(data) => data,
            Err(e) => {
                log::error!("\t bson decoding error for node {}, err : {:?}", i, e);
                return Err(anyhow!("bson decoding error for node {} : {}", i, e));
            }
        };
        if array.push_row(ArrayView1::from(data_1d.as_slice())).is_err() {
            return Err(anyhow!("could not insert array vector {:?}, length {}", i, data_1d.len()));
        }
    }
    log::info!("\t finished bson decoding of embedded vectors");
    // trying node indexation
    let bson_indexation = match Document::from_reader(&mut bufreader) {
        Ok(doc) => doc,
        Err(e) => {
            log::info!("could not find indexation document in file {}, err : {:?}", fname, e);
            return Ok(EmbeddedBsonReload::new(array, None));
        }
    };
    log::info!("\t found document , node indexation");
    let mut ranked = Vec::<(i64, NodeId)>::with_capacity(bson_indexation.len());
    for (key, value) in bson_indexation.iter() {
        let node_id = match NodeId::from_str(key) {
            Ok(node_id) => node_id,
            Err(_e) => {
                log::error!("could not decode node_id {}", key);
                return Err(anyhow!("could not decode node_id {}", key));
            }
        };
        let rank = match value.as_i64() {
            Some(rank) => rank,
            None => {
                log::error!("could get node rank for node_id {}", key);
                return Err(anyhow!("could get node rank for node_id {}", key));
            }
        };
        ranked.push((rank, node_id));
    }
    ranked.sort_unstable_by_key(|r| r.0);
    let node_indexation: IndexSet<NodeId> = ranked.into_iter().map(|r| r.1).collect();
    if node_indexation.len() != nb_data {
        return Err(anyhow!(
            "indexation has {} nodes, expected {}",
            node_indexation.len(),
            nb_data
        ));
    }
    Ok(EmbeddedBsonReload::new(array, Some(node_indexation)))
} // end of bson_load

/// This function checks equality of embedded and reloaded
pub fn check_equality<F, NodeId, EmbeddedData>(
    embedding: &Embedding<F, NodeId, EmbeddedData>,
    reloaded: &EmbeddedBsonReload<F, NodeId>,
) -> Result<bool, anyhow::Error>
where
    NodeId: std::hash::Hash + std::cmp::Eq + Display,
    EmbeddedData: EmbeddedT<F>,
    F: PartialEq + Display,
{
    let embedded_data = embedding.get_embedded_data();
    let reloaded_data = reloaded.get_embedded();
    if reloaded_data.dim() != (embedded_data.get_nb_nodes(), embedded_data.get_dimension()) {
        return Err(anyhow!(
            "reloaded dimensions {:?} differ from embedded",
            reloaded_data.dim()
        ));
    }
    for i in 0..embedded_data.get_nb_nodes() {
        let vec_e = embedded_data.get_embedded_node(i);
        for j in 0..embedded_data.get_dimension() {
            if vec_e[j] != reloaded_data[[i, j]] {
                log::error!(
                    " reloaded differ from embedded at vector rank : {}, dim j : {}, embedded : {}, reloaded : {}",
                    i,
                    j,
                    vec_e[j],
                    reloaded_data[[i, j]]
                );
                return Ok(false);
            }
        }
    }
    // check equality of node indexation
    if let Some(loaded_indexation) = reloaded.get_node_indexation() {
        log::debug!("checking node indexation");
        let node_indexation = embedding.get_node_indexation();
        if loaded_indexation.len() != node_indexation.len() {
            return Ok(false);
        }
        for (i, (indexed, reload_indexed)) in node_indexation.iter().zip(loaded_indexation.iter()).enumerate() {
            if indexed != reload_indexed {
                log::error!(
                    "check equality of node indexation failed at slot i : {} , node_indexation : {}, reloaded {}",
                    i,
                    indexed,
                    reload_indexed
                );
                return Ok(false);
            }
        }
    } // end case node_indexation
    log::debug!("check_equality exiting");
    Ok(true)
} // end of check equality

// end of mod tests
