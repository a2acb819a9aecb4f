//! an executable for binarized attributed network embedding
//! example usage:
//! bane --edge-path "cora_edges.csv" --feature-path "cora_features.json" --output-path "cora.csv"
//! bane --edge-path "edges.csv" --feature-path "features.csv" --features dense --dimensions 32 --order 2 --bson
//!
//! The edge file is a csv file with header, each record giving 2 node ids.
//! The feature file is a json file mapping each node id to the list of its attribute ids (sparse mode, the default)
//! or a csv file with header, first column being the node id (dense mode).
//! The embedding is written as csv with header id,x_0,...,x_{d-1}. With --bson it is also dumped in bson format
//! in a file with the same name and extension bson.


use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command};

use banembed::prelude::*;


/// what we need to run an embedding from the command line
#[derive(Debug)]
struct BaneArgs {
    edge_path: PathBuf,
    feature_path: PathBuf,
    output_path: PathBuf,
    feature_mode: FeatureMode,
    params: BaneParams,
    bson: bool,
}


fn parse_value<T: std::str::FromStr>(matches : &ArgMatches, name : &str) -> Result<T, anyhow::Error> {
    match matches.value_of(name) {
        Some(str) => {
            match str.parse::<T>() {
                Ok(val) => Ok(val),
                _       => Err(anyhow!("error parsing {}, got {}", name, str)),
            }
        },
        _   => Err(anyhow!("no value for {}", name)),
    }
} // end of parse_value


fn parse_bane_args(matches : &ArgMatches) -> Result<BaneArgs, anyhow::Error> {
    log::debug!("in parse_bane_args");
    let edge_path = PathBuf::from(parse_value::<String>(matches, "edge-path")?);
    let feature_path = PathBuf::from(parse_value::<String>(matches, "feature-path")?);
    let output_path = PathBuf::from(parse_value::<String>(matches, "output-path")?);
    let feature_mode = match matches.value_of("features") {
        Some(str) => str.parse::<FeatureMode>()?,
        _         => FeatureMode::Sparse,
    };
    //
    let params = BaneParams::new(
        parse_value::<usize>(matches, "dimensions")?,
        parse_value::<usize>(matches, "binarization-rounds")?,
        parse_value::<usize>(matches, "approximation-rounds")?,
        parse_value::<usize>(matches, "order")?,
        parse_value::<f64>(matches, "gamma")?,
        parse_value::<f64>(matches, "alpha")?,
        parse_value::<u64>(matches, "seed")?,
    );
    if params.get_dimension() == 0 {
        return Err(anyhow!("dimensions must be at least 1"));
    }
    if params.get_order() == 0 {
        return Err(anyhow!("order must be at least 1"));
    }
    if params.get_alpha() <= 0. {
        log::warn!("alpha = {} is not positive, the kernel estimation can be singular", params.get_alpha());
    }
    let bson = matches.is_present("bson");
    Ok(BaneArgs{edge_path, feature_path, output_path, feature_mode, params, bson})
} // end of parse_bane_args


fn build_command() -> Command<'static> {
    Command::new("bane")
        .about("binarized attributed network embedding")
        .arg(Arg::new("edge-path")
            .long("edge-path")
            .takes_value(true)
            .default_value("./input/ptbr_edges.csv")
            .help("csv edge list with header"))
        .arg(Arg::new("feature-path")
            .long("feature-path")
            .takes_value(true)
            .default_value("./input/ptbr_features.json")
            .help("node features, json (sparse) or csv (dense)"))
        .arg(Arg::new("output-path")
            .long("output-path")
            .takes_value(true)
            .default_value("./output/ptbr_bane.csv")
            .help("csv file for the embedding"))
        .arg(Arg::new("features")
            .long("features")
            .takes_value(true)
            .default_value("sparse")
            .help("specify \"sparse\" or \"dense\""))
        .arg(Arg::new("dimensions")
            .long("dimensions")
            .takes_value(true)
            .default_value("48")
            .help("embedding dimension"))
        .arg(Arg::new("binarization-rounds")
            .long("binarization-rounds")
            .takes_value(true)
            .default_value("10")
            .help("number of outer rounds of binary fitting"))
        .arg(Arg::new("approximation-rounds")
            .long("approximation-rounds")
            .takes_value(true)
            .default_value("5")
            .help("number of coordinate descent sweeps by round"))
        .arg(Arg::new("order")
            .long("order")
            .takes_value(true)
            .default_value("1")
            .help("power of the propagation operator"))
        .arg(Arg::new("gamma")
            .long("gamma")
            .takes_value(true)
            .default_value("0.7")
            .help("weight of neighbours in propagation"))
        .arg(Arg::new("alpha")
            .long("alpha")
            .takes_value(true)
            .default_value("0.01")
            .help("ridge regularization of kernel estimation"))
        .arg(Arg::new("seed")
            .long("seed")
            .takes_value(true)
            .default_value("42")
            .help("seed of the random binary initialization"))
        .arg(Arg::new("bson")
            .long("bson")
            .help("also dump embedding in bson format"))
} // end of build_command


fn run(args : &BaneArgs) -> Result<(), anyhow::Error> {
    log::info!("reading edges from {:?}", args.edge_path);
    let edges = read_edge_list(&args.edge_path)?;
    let features = read_features(&args.feature_path, args.feature_mode)?;
    //
    let mut bane = Bane::from_edges(args.params, &edges, features)?;
    let nb_nodes = bane.get_nb_nodes();
    let embedding: Embedding<i8, usize, Embedded<i8>> = Embedding::new(identity_indexation(nb_nodes), &mut bane)?;
    //
    let output_name = Some(args.output_path.to_string_lossy().into_owned());
    dump_embedding(&embedding, &Output::new(Format::CSV, true, &output_name))?;
    if args.bson {
        dump_embedding(&embedding, &Output::new(Format::BSON, true, &output_name))?;
    }
    Ok(())
} // end of run


pub fn main() {
    //
    env_logger::Builder::from_default_env().init();
    log::info!("logger initialized");
    //
    let matches = build_command().get_matches();
    let args = match parse_bane_args(&matches) {
        Ok(args) => args,
        Err(e) => {
            log::error!("error parsing arguments : {}", e);
            std::process::exit(1);
        }
    };
    log::info!("args : {:?}", args);
    if let Err(e) = run(&args) {
        log::error!("error : {:?}", e);
        log::error!("bane embedding failed");
        std::process::exit(1);
    }
    log::info!("embedding written in {:?}", args.output_path);
}  // end fo main


#[cfg(test)]
mod tests {

    use super::*;

    use std::io::Write;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn write_tmp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_default_args() {
        let matches = build_command().try_get_matches_from(vec!["bane"]).unwrap();
        let args = parse_bane_args(&matches).unwrap();
        assert_eq!(args.feature_mode, FeatureMode::Sparse);
        assert_eq!(args.params.get_dimension(), 48);
        assert_eq!(args.params.get_binarization_rounds(), 10);
        assert_eq!(args.params.get_approximation_rounds(), 5);
        assert_eq!(args.params.get_order(), 1);
        assert_eq!(args.params.get_gamma(), 0.7);
        assert_eq!(args.params.get_alpha(), 0.01);
        assert_eq!(args.params.get_seed(), 42);
        assert!(!args.bson);
    }

    #[test]
    fn test_bad_args() {
        let matches = build_command()
            .try_get_matches_from(vec!["bane", "--features", "sparse_matrix"])
            .unwrap();
        assert!(parse_bane_args(&matches).is_err());
        let matches = build_command().try_get_matches_from(vec!["bane", "--order", "0"]).unwrap();
        assert!(parse_bane_args(&matches).is_err());
    }

    // 4 nodes, 3 dense features, dimension 2
    #[test]
    fn test_run_dense() {
        log_init_test();
        let edge_path = write_tmp("banembed_run_edges.csv", "id_1,id_2\n0,1\n1,2\n2,3\n");
        let feature_path = write_tmp(
            "banembed_run_features.csv",
            "id,f_0,f_1,f_2\n0,1,0,2\n1,0,1,1\n2,3,1,0\n3,0,2,1\n",
        );
        let output_path = std::env::temp_dir().join("banembed_run_out.csv");
        let output_str = output_path.to_string_lossy().into_owned();
        let matches = build_command()
            .try_get_matches_from(vec![
                "bane",
                "--edge-path", edge_path.to_str().unwrap(),
                "--feature-path", feature_path.to_str().unwrap(),
                "--output-path", output_str.as_str(),
                "--features", "dense",
                "--dimensions", "2",
                "--binarization-rounds", "3",
                "--approximation-rounds", "2",
                "--bson",
            ])
            .unwrap();
        let args = parse_bane_args(&matches).unwrap();
        run(&args).unwrap();
        //
        let content = std::fs::read_to_string(&output_path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("id,x_0,x_1"));
        let mut nb_rows = 0;
        for (i, line) in lines.enumerate() {
            let fields: Vec<&str> = line.split(',').collect();
            assert_eq!(fields.len(), 3);
            assert_eq!(fields[0], i.to_string());
            assert!(fields[1..].iter().all(|f| *f == "1" || *f == "-1"));
            nb_rows += 1;
        }
        assert_eq!(nb_rows, 4);
        // the bson dump reloads to the same vectors
        let reloaded = bson_load::<i8, usize>(output_path.with_extension("bson").to_str().unwrap()).unwrap();
        assert_eq!(reloaded.get_embedded().dim(), (4, 2));
    } // end of test_run_dense

    // the embedding goes exactly to --output-path whatever its extension, the bson dump swaps the extension
    #[test]
    fn test_run_output_path_kept() {
        log_init_test();
        let edge_path = write_tmp("banembed_txt_edges.csv", "id_1,id_2\n0,1\n1,2\n2,3\n3,0\n");
        let feature_path = write_tmp("banembed_txt_features.json", r#"{"0": [0, 2], "1": [1], "2": [0, 1], "3": [2]}"#);
        let output_path = std::env::temp_dir().join("banembed_txt_out.txt");
        let wrong_path = output_path.with_extension("csv");
        let _ = std::fs::remove_file(&output_path);
        let _ = std::fs::remove_file(&wrong_path);
        let matches = build_command()
            .try_get_matches_from(vec![
                "bane",
                "--edge-path", edge_path.to_str().unwrap(),
                "--feature-path", feature_path.to_str().unwrap(),
                "--output-path", output_path.to_str().unwrap(),
                "--dimensions", "2",
                "--binarization-rounds", "2",
                "--approximation-rounds", "1",
                "--bson",
            ])
            .unwrap();
        let args = parse_bane_args(&matches).unwrap();
        run(&args).unwrap();
        assert!(output_path.exists());
        assert!(!wrong_path.exists());
        let content = std::fs::read_to_string(&output_path).unwrap();
        assert_eq!(content.lines().next(), Some("id,x_0,x_1"));
        assert_eq!(content.lines().count(), 5);
        assert!(output_path.with_extension("bson").exists());
    } // end of test_run_output_path_kept
} // end of mod tests
