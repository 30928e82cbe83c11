#[cfg(test)]
mod topology_regression_tests {
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    use topogen::config::{DragonflyConfig, PolarflyConfig, TopologyConfig};
    use topogen::config_loader::load_config;
    use topogen::export::{parse_topology_file, SimulatorSnapshot};
    use topogen::field::FieldCache;
    use topogen::orchestrator::{build_batch, build_topology, validate_built, write_outputs};
    use topogen::topology::{
        DragonflyGraphBuilder, DragonflyRoutingTableBuilder, DragonflyTopology, NetworkTopology,
        PolarflyTopology,
    };
    use topogen::utils::validation::{degree_histogram, diameter, validate_routing_table};

    /// Polarfly sizes, degrees and diameter for a spread of prime powers
    #[test]
    fn test_polarfly_structure() {
        for q in [2u32, 3, 4, 5, 7, 8, 9, 11, 13, 16] {
            let pf = PolarflyTopology::from_order(q).unwrap();
            let graph = pf.graph();
            let q = q as usize;

            assert_eq!(graph.vertex_count(), q * q + q + 1, "q={}", q);
            assert_eq!(graph.edge_count(), q * (q + 1) * (q + 1) / 2, "q={}", q);
            assert_eq!(graph.max_degree(), q + 1, "q={}", q);
            assert_eq!(diameter(graph), Some(2), "q={}", q);

            let histogram = degree_histogram(graph);
            assert_eq!(histogram.get(&q), Some(&(q + 1)), "q={} quadrics", q);
            assert_eq!(histogram.get(&(q + 1)), Some(&(q * q)), "q={} non-quadrics", q);
            for &v in pf.quadrics() {
                assert_eq!(graph.degree(v), q);
            }
        }
    }

    /// Vertex 0 is (0,0,1) and its neighbors are the line z = 0
    #[test]
    fn test_polarfly_vertex_zero() {
        let pf = PolarflyTopology::from_order(5).unwrap();
        assert_eq!(pf.points()[0], [0, 0, 1]);
        let neighbors = pf.graph().neighbors(0);
        assert_eq!(neighbors.len(), 6);
        assert!(!neighbors.contains(&0));
        for &v in neighbors {
            assert_eq!(pf.points()[v as usize][2], 0);
        }
    }

    #[test]
    fn test_polarfly_routing_valid() {
        for q in [7u32, 8, 9] {
            let pf = PolarflyTopology::from_order(q).unwrap();
            let table = pf.routing_table().unwrap();
            validate_routing_table(pf.graph(), &table).unwrap();
            assert_eq!(table.max_hops(), 2);
        }
    }

    /// Realized mean degree equals d exactly
    #[test]
    fn test_dragonfly_mean_degree() {
        for degree in [2u32, 5, 8, 11, 14] {
            let df = DragonflyGraphBuilder::new(degree, None).unwrap().build().unwrap();
            let graph = df.graph();
            assert_eq!(graph.total_degree(), degree as usize * graph.vertex_count(), "d={}", degree);
            assert!(diameter(graph).unwrap() <= 3, "d={}", degree);
        }
    }

    #[test]
    fn test_dragonfly_routing_valid() {
        for degree in [5u32, 8] {
            let df = DragonflyGraphBuilder::new(degree, None).unwrap().build().unwrap();
            let table = DragonflyRoutingTableBuilder::new(&df).build().unwrap();
            validate_routing_table(df.graph(), &table).unwrap();
            for (_, _, paths) in table.iter() {
                assert!(paths[0].path.len() <= 4);
                assert!(paths[0].hops() >= 1);
            }
        }
    }

    #[test]
    fn test_dragonfly_router_count_mismatch() {
        assert!(DragonflyTopology::new(5, Some(36)).is_ok());
        assert!(DragonflyTopology::new(5, Some(35)).is_err());
        assert!(DragonflyTopology::new(4, None).is_err());
    }

    /// Two independent runs write byte-identical files
    #[test]
    fn test_outputs_are_deterministic() {
        let configs = vec![
            TopologyConfig::Polarfly(PolarflyConfig::new(5)),
            TopologyConfig::Dragonfly(DragonflyConfig::new(5, Some(36))),
        ];
        let first_dir = TempDir::new().unwrap();
        let second_dir = TempDir::new().unwrap();

        for dir in [&first_dir, &second_dir] {
            for built in build_batch(&configs).unwrap() {
                write_outputs(&built, dir.path()).unwrap();
            }
        }

        for name in [
            "PolarFly.q_5.topo",
            "PolarFly.q_5.json",
            "PolarFly.q_5.txt",
            "Dragonfly.d_5_a_4_g_9.topo",
            "Dragonfly.d_5_a_4_g_9.json",
        ] {
            let first = std::fs::read(first_dir.path().join(name)).unwrap();
            let second = std::fs::read(second_dir.path().join(name)).unwrap();
            assert!(!first.is_empty(), "{} is empty", name);
            assert_eq!(first, second, "{} differs between runs", name);
        }
    }

    /// Written files parse back into the graph that produced them
    #[test]
    fn test_written_files_round_trip() {
        let dir = TempDir::new().unwrap();
        let config = TopologyConfig::Dragonfly(DragonflyConfig::new(8, None));
        let built = build_topology(&config, &FieldCache::new()).unwrap();
        write_outputs(&built, dir.path()).unwrap();

        let parsed = parse_topology_file(&dir.path().join(format!("{}.topo", built.name))).unwrap();
        assert_eq!(parsed.to_graph().unwrap(), built.graph);

        let snapshot = SimulatorSnapshot::read_json(&dir.path().join(format!("{}.json", built.name))).unwrap();
        assert_eq!(snapshot.vertex_count, built.graph.vertex_count());
        assert_eq!(snapshot.endpoints_per_router, 3);
        assert_eq!(snapshot.routing, built.routing);
    }

    /// End-to-end: YAML file to validated topologies
    #[test]
    fn test_config_to_topologies() {
        let yaml = r#"
general:
  log_level: warn
topologies:
  - "polarfly:4"
  - polarfly:
      q: 3
      hosts_per_router: 1
      routing: false
  - "dragonfly:5:36"
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        let built = build_batch(&config.resolved_topologies().unwrap()).unwrap();
        assert_eq!(built.len(), 3);
        assert_eq!(built[1].endpoints_per_router, 1);
        assert!(built[1].routing.is_none());
        for topology in &built {
            validate_built(topology).unwrap();
        }
    }

    #[test]
    fn test_batch_fails_on_bad_order() {
        let configs = vec![
            TopologyConfig::Polarfly(PolarflyConfig::new(5)),
            TopologyConfig::Polarfly(PolarflyConfig::new(6)),
        ];
        assert!(build_batch(&configs).is_err());
    }
}
