//! Describes the Embedded vectors.
//!
//! Embedded vectors are described by an Array2\<F\>, each row corresponds to a node.
//! For the Bane binary embedding F is i8 and all entries are -1 or +1.
//!
//! The [Embedding] structure associates embedded vectors to the original node identifiers.
//!
//! - Bane is described by the paper :
//!     *Binarized Attributed Network Embedding. ICDM 2018*
//!     H. Yang, S. Pan, P. Zhang, L. Chen, D. Lian and C. Zhang.

use ndarray::{Array2, ArrayView1};
use indexmap::IndexSet;

use crate::io::embeddedbson::EmbeddedBsonReload;

/// to represent the distance in embedded space between 2 vectors
type Distance<F> = fn(&[F], &[F]) -> f64;

/// The Embedded trait. It defines the interface satisfied by embedded data.
/// In our implementations the embedded data are stored in Array2 and embedded node
/// are identified by their rank.
/// F is the type contained in embedded vectors
pub trait EmbeddedT<F> {
    /// get dimension of vectors of the Embedded
    fn get_dimension(&self) -> usize;
    /// get distance in embedded space between nodes identified by their rank in embedded space
    fn get_noderank_distance(&self, node_rank1: usize, node_rank2: usize) -> f64;
    /// the trait provides a function distance between embedded items.
    fn get_vec_distance(&self, from: &[F], to: &[F]) -> f64;
    /// get number of nodes
    fn get_nb_nodes(&self) -> usize;
    /// get embedding of node of rank rank.
    fn get_embedded_node(&self, node_rank: usize) -> ArrayView1<F>;
    /// Returns the distance function f (a pointer to) used for computing distances the embedding.
    fn get_distance(&self) -> fn(&[F], &[F]) -> f64;
} // end of trait

/// represent Embedded data without information on the node indexation
/// To get also the node indexation information use the [Embedding] structure
pub struct Embedded<F> {
    /// array (n,d) with n number of data, d dimension of Embedded
    data: Array2<F>,
    /// distance between vectors in embedded space. helps to implement trait [EmbeddedT\<F\>]
    distance: Distance<F>,
} // end of Embedded

impl<F> Embedded<F> {
    // fills embedded vectors with the appropriate distance function
    pub(crate) fn new(arr: Array2<F>, distance: Distance<F>) -> Self {
        Embedded {
            data: arr,
            distance,
        }
    }

    /// get the array of embedded vectors
    pub fn get_embedded(&self) -> &Array2<F> {
        &self.data
    }
} // end of impl Embedded

impl<F: Clone> EmbeddedT<F> for Embedded<F> {
    /// get dimension of Embedded. (row size of Array)
    fn get_dimension(&self) -> usize {
        self.data.dim().1
    }

    /// computes the distance in embedded space between 2 vectors
    /// dimensions must be equal to Embedded dimension
    fn get_vec_distance(&self, data1: &[F], data2: &[F]) -> f64 {
        assert_eq!(data1.len(), self.get_dimension());
        (self.distance)(data1, data2)
    }

    /// get distance between nodes identified by their rank!
    fn get_noderank_distance(&self, node1: usize, node2: usize) -> f64 {
        let row1 = self.data.row(node1);
        let row2 = self.data.row(node2);
        match (row1.as_slice(), row2.as_slice()) {
            (Some(s1), Some(s2)) => (self.distance)(s1, s2),
            // rows not contiguous, we must copy
            _ => (self.distance)(&row1.to_vec(), &row2.to_vec()),
        }
    }

    /// return number of nodes
    fn get_nb_nodes(&self) -> usize {
        self.data.dim().0
    }

    /// get embedding of node of rank rank
    fn get_embedded_node(&self, node_rank: usize) -> ArrayView1<F> {
        self.data.row(node_rank)
    }

    /// get distance function
    fn get_distance(&self) -> fn(&[F], &[F]) -> f64 {
        self.distance
    }
} // end impl EmbeddedT<F>

//====================================================================================

/// The trait EmbedderT is something whose method embed has as output something satisfying the trait EmbeddedT\<F\>.
/// For example Bane produces an [`Embedded<i8>`] .
/// F is the type contained in embedded vectors
pub trait EmbedderT<F> {
    type Output: EmbeddedT<F>;
    ///
    fn embed(&mut self) -> Result<Self::Output, anyhow::Error>;
} // end of trait EmbedderT<F>

//==============================================================================

/// The structure collecting the result of the embedding process
///
/// - F the embedded vectors contains values of type F (i8 for binary embedding)
///
/// - NodeId is the type representing nodes (most often an usize). It must
///     implement Hash and Eq to be indexed.
///
/// - nodeindexation : an IndexSet storing Node identifier (as in datafile) and associating it to a rank in Array representing embedded nodes
///                      given a node id we get its rank in Array using IndexSet::get_index_of
///                      given a rank we get original node id by using IndexSet::get_index.
///
/// - embbeded : the embedded data of type EmbeddedData.
pub struct Embedding<F, NodeId: std::hash::Hash + std::cmp::Eq, EmbeddedData: EmbeddedT<F>> {
    /// association of nodeid to a rank.
    nodeindexation: IndexSet<NodeId>,
    ///
    embedded: EmbeddedData,
    ///
    mark: std::marker::PhantomData<F>,
} // end of Embedding

impl<NodeId, EmbeddedData, F> Embedding<F, NodeId, EmbeddedData>
where
    EmbeddedData: EmbeddedT<F>,
    NodeId: std::hash::Hash + std::cmp::Eq,
{
    /// Creates an embedding of a Graph given a structure implementing an embedding (Bane)
    pub fn new(
        nodeindexation: IndexSet<NodeId>,
        embedder: &mut dyn EmbedderT<F, Output = EmbeddedData>,
    ) -> Result<Self, anyhow::Error> {
        let embedded = match embedder.embed() {
            Ok(embedded) => embedded,
            Err(e) => {
                log::error!("embedding failed");
                return Err(e);
            }
        };
        if embedded.get_nb_nodes() != nodeindexation.len() {
            log::error!(
                "embedding has {} vectors, indexation has {} nodes",
                embedded.get_nb_nodes(),
                nodeindexation.len()
            );
            return Err(anyhow::anyhow!("embedding and node indexation sizes differ"));
        }
        Ok(Embedding {
            nodeindexation,
            embedded,
            mark: std::marker::PhantomData,
        })
    } // end of new

    /// to retrieve the indexation
    pub fn get_node_indexation(&self) -> &IndexSet<NodeId> {
        &self.nodeindexation
    } // end of get_node_indexation

    /// retrives the embedding asked for
    pub fn get_embedded_data(&self) -> &EmbeddedData {
        &self.embedded
    } // end of get_embedded_data

    /// get distance between nodes, given their original node id
    pub fn get_node_distance(&self, node1: NodeId, node2: NodeId) -> Option<f64> {
        let rank1 = self.nodeindexation.get_index_of(&node1)?;
        let rank2 = self.nodeindexation.get_index_of(&node2)?;
        Some(self.embedded.get_noderank_distance(rank1, rank2))
    } // get_noderank_distance

    /// get rank of a node_id.
    pub fn get_node_rank(&self, node_id: NodeId) -> Option<usize> {
        self.nodeindexation.get_index_of(&node_id)
    }

    /// get node_id given its rank in indexation (and matrix representation)
    pub fn get_node_id(&self, rank: usize) -> Option<&NodeId> {
        self.nodeindexation.get_index(rank)
    }
} // end of impl Embedding

/// The identity indexation : node of rank i has id i. This is the indexation of Bane embeddings
/// where features and edges refer to nodes by their row index.
pub fn identity_indexation(nb_nodes: usize) -> IndexSet<usize> {
    (0..nb_nodes).collect::<IndexSet<usize>>()
}

/// make an Embedding<i8,..> structure from binary data reloaded from bson data
pub fn from_bson_with_hamming<NodeId>(
    bson_reload: EmbeddedBsonReload<i8, NodeId>,
) -> Result<Embedding<i8, NodeId, Embedded<i8>>, anyhow::Error>
where
    NodeId: std::hash::Hash + std::cmp::Eq,
{
    let (data, node_indexation) = bson_reload.into_parts();
    let node_indexation = match node_indexation {
        Some(indexation) => indexation,
        None => {
            return Err(anyhow::anyhow!("no node indexation in bson dump"));
        }
    };
    let embedded_data = Embedded::new(data, crate::embed::tools::hamming::hamming_distance::<i8>);
    Ok(Embedding::<i8, NodeId, Embedded<i8>> {
        nodeindexation: node_indexation,
        embedded: embedded_data,
        mark: std::marker::PhantomData,
    })
} // end of from_bson_with_hamming

//==============================================================================

#[cfg(test)]
mod tests {

    use super::*;

    use ndarray::array;

    struct FixedEmbedder {
        data: Array2<i8>,
    }

    impl EmbedderT<i8> for FixedEmbedder {
        type Output = Embedded<i8>;
        fn embed(&mut self) -> Result<Embedded<i8>, anyhow::Error> {
            Ok(Embedded::new(
                self.data.clone(),
                crate::embed::tools::hamming::hamming_distance::<i8>,
            ))
        }
    }

    #[test]
    fn test_embedding_indexation_and_distance() {
        let data = array![[1i8, -1, 1, 1], [1, 1, 1, 1], [-1, 1, -1, -1]];
        let mut embedder = FixedEmbedder { data };
        let embedding = Embedding::new(identity_indexation(3), &mut embedder).unwrap();
        assert_eq!(embedding.get_node_rank(2), Some(2));
        assert_eq!(embedding.get_node_id(1), Some(&1));
        let embedded = embedding.get_embedded_data();
        assert_eq!(embedded.get_dimension(), 4);
        assert_eq!(embedded.get_nb_nodes(), 3);
        // 1 differing coordinate out of 4
        assert!((embedding.get_node_distance(0, 1).unwrap() - 0.25).abs() < 1.0E-12);
        // all coordinates differ
        assert!((embedding.get_node_distance(0, 2).unwrap() - 1.).abs() < 1.0E-12);
        assert!(embedding.get_node_distance(0, 7).is_none());
        // the distance function is the hamming distance on rows
        let rows = embedded.get_embedded();
        let dist = embedded.get_distance();
        let (r0, r2) = (rows.row(0).to_vec(), rows.row(2).to_vec());
        assert_eq!(dist(&r0, &r2), embedded.get_vec_distance(&r0, &r2));
        assert_eq!(dist(&r0, &r2), embedded.get_noderank_distance(0, 2));
    } // end of test_embedding_indexation_and_distance

    #[test]
    fn test_embedding_size_mismatch() {
        let data = array![[1i8, -1], [1, 1]];
        let mut embedder = FixedEmbedder { data };
        assert!(Embedding::new(identity_indexation(3), &mut embedder).is_err());
    }
} // end of mod tests
