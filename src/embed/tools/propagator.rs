//! construction of the propagation operator used to diffuse node attributes along edges.
//!
//! The graph is considered undirected, multiple edges are merged and self loops present in the data are discarded.
//! Then each node receives one self loop. With $k_{i}$ the number of (distinct) neighbours of node i,
//! the degree of node i in the self loop augmented graph is $k_{i} + 2$ (a loop counts twice) and
//! the operator is $$ P_{0} = I - \gamma D^{-1} L $$
//! where L is the laplacian of the augmented graph (loops cancel in L so $L_{ii} = k_{i}$).
//! Rows of $P_{0}$ sum to 1.

use anyhow::anyhow;

use cpu_time::ProcessTime;
use std::time::SystemTime;

use petgraph::graphmap::UnGraphMap;
use sprs::{CsMat, TriMatI};

/// returns the number of nodes implied by an edge list, i.e max node id + 1
pub fn get_nb_nodes_from_edges(edges: &[(usize, usize)]) -> usize {
    edges
        .iter()
        .fold(0usize, |acc, (i, j)| acc.max(*i + 1).max(*j + 1))
} // end of get_nb_nodes_from_edges

/// builds the degree normalized propagation operator (a csr matrix of size nb_nodes x nb_nodes).
/// Nodes are identified by their id in edges, which must be less than nb_nodes. Nodes with no edge get an identity row.
pub fn normalize(
    edges: &[(usize, usize)],
    nb_nodes: usize,
    gamma: f64,
) -> Result<CsMat<f64>, anyhow::Error> {
    //
    log::debug!(
        "propagator normalize, nb edges : {}, nb_nodes : {}, gamma : {}",
        edges.len(),
        nb_nodes,
        gamma
    );
    let mut graph = UnGraphMap::<usize, ()>::with_capacity(nb_nodes, edges.len());
    for i in 0..nb_nodes {
        graph.add_node(i);
    }
    let mut nb_loops = 0usize;
    for &(i, j) in edges {
        if i >= nb_nodes || j >= nb_nodes {
            log::error!(
                "propagator normalize : edge ({}, {}) out of node range {}",
                i,
                j,
                nb_nodes
            );
            return Err(anyhow!(
                "edge ({}, {}) refers to a node id >= nb_nodes {}",
                i,
                j,
                nb_nodes
            ));
        }
        if i == j {
            nb_loops += 1;
            continue;
        }
        graph.add_edge(i, j, ());
    }
    if nb_loops > 0 {
        log::info!("propagator normalize : discarded {} self loops", nb_loops);
    }
    //
    let nnz = 2 * graph.edge_count() + nb_nodes;
    let mut rows = Vec::<usize>::with_capacity(nnz);
    let mut cols = Vec::<usize>::with_capacity(nnz);
    let mut values = Vec::<f64>::with_capacity(nnz);
    for i in 0..nb_nodes {
        let nb_neighbours = graph.neighbors(i).count();
        let degree = (nb_neighbours + 2) as f64;
        rows.push(i);
        cols.push(i);
        values.push(1. - gamma * nb_neighbours as f64 / degree);
        for j in graph.neighbors(i) {
            rows.push(i);
            cols.push(j);
            values.push(gamma / degree);
        }
    }
    let trimat = TriMatI::<f64, usize>::from_triplets((nb_nodes, nb_nodes), rows, cols, values);
    let csr_mat: CsMat<f64> = trimat.to_csr();
    log::info!(
        "propagator built, nb nodes : {}, nb undirected edges : {}, nnz : {}",
        nb_nodes,
        graph.edge_count(),
        csr_mat.nnz()
    );
    Ok(csr_mat)
} // end of normalize

/// returns mat raised to power order by order-1 products with mat. order must be >= 1.
pub fn power(mat: &CsMat<f64>, order: usize) -> Result<CsMat<f64>, anyhow::Error> {
    if order == 0 {
        log::error!("propagator power : order must be >= 1");
        return Err(anyhow!("propagator power : order must be >= 1, got 0"));
    }
    if mat.rows() != mat.cols() || !mat.is_csr() {
        return Err(anyhow!(
            "propagator power : expecting a square csr matrix, got shape ({}, {})",
            mat.rows(),
            mat.cols()
        ));
    }
    let cpu_start = ProcessTime::now();
    let sys_start = SystemTime::now();
    let mut powered = mat.clone();
    for p in 1..order {
        powered = sprs::smmp::mul_csr_csr(powered.view(), mat.view());
        log::debug!("propagator power {}, nnz : {}", p + 1, powered.nnz());
    }
    if order > 1 {
        log::info!(
            "propagator power {} done, sys time(ms) {:?}, cpu time(ms) {:?}",
            order,
            sys_start.elapsed().map(|d| d.as_millis()).unwrap_or(0),
            cpu_start.elapsed().as_millis()
        );
    }
    Ok(powered)
} // end of power

//===============================================================

#[cfg(test)]
mod tests {

    use super::*;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_normalize_path() {
        log_init_test();
        // path 0 - 1 - 2, with a duplicated edge and a self loop that must be discarded
        let edges = vec![(0, 1), (1, 2), (1, 0), (2, 2)];
        let nb_nodes = get_nb_nodes_from_edges(&edges);
        assert_eq!(nb_nodes, 3);
        let gamma = 0.7;
        let p0 = normalize(&edges, nb_nodes, gamma).unwrap();
        let dense = p0.to_dense();
        log::debug!("propagator : {:?}", dense);
        // node 0 has one neighbour so degree 3
        assert!((dense[[0, 0]] - (1. - gamma / 3.)).abs() < 1.0E-12);
        assert!((dense[[0, 1]] - gamma / 3.).abs() < 1.0E-12);
        assert_eq!(dense[[0, 2]], 0.);
        // node 1 has two neighbours so degree 4
        assert!((dense[[1, 1]] - (1. - gamma * 2. / 4.)).abs() < 1.0E-12);
        assert!((dense[[1, 0]] - gamma / 4.).abs() < 1.0E-12);
        assert!((dense[[1, 2]] - gamma / 4.).abs() < 1.0E-12);
        // self loop in data is not a neighbour
        assert!((dense[[2, 2]] - (1. - gamma / 3.)).abs() < 1.0E-12);
        for i in 0..nb_nodes {
            assert!((dense.row(i).sum() - 1.).abs() < 1.0E-12);
        }
    } // end of test_normalize_path

    #[test]
    fn test_isolated_node() {
        log_init_test();
        let edges = vec![(0, 1)];
        let p0 = normalize(&edges, 3, 0.5).unwrap();
        let dense = p0.to_dense();
        assert_eq!(dense[[2, 2]], 1.);
        assert_eq!(dense.row(2).sum(), 1.);
    } // end of test_isolated_node

    #[test]
    fn test_normalize_out_of_range() {
        log_init_test();
        let edges = vec![(0, 1), (1, 5)];
        assert!(normalize(&edges, 3, 0.7).is_err());
    }

    #[test]
    fn test_power() {
        log_init_test();
        let edges = vec![(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)];
        let p0 = normalize(&edges, 4, 0.7).unwrap();
        let dense = p0.to_dense();
        // order 1 is the operator itself
        let p1 = power(&p0, 1).unwrap();
        assert_eq!(p1.to_dense(), dense);
        // order 3 against dense products
        let p3 = power(&p0, 3).unwrap().to_dense();
        let check = dense.dot(&dense).dot(&dense);
        for i in 0..4 {
            for j in 0..4 {
                assert!((p3[[i, j]] - check[[i, j]]).abs() < 1.0E-12);
            }
        }
        // order 0 is rejected
        assert!(power(&p0, 0).is_err());
    } // end of test_power
} // end of mod tests
