//! # Integration Tests
//!
//! End-to-end tests for the spool → parser → dispatcher → sink pipeline,
//! driven against real sockets and temp directories instead of mocks
//! wherever a protocol endpoint is cheap to stand up.

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::Path;

    use contracts::{Dispatch, RelayConfig, SinkConfig, SinkType};
    use dispatcher::Dispatcher;
    use ingestion::{PerfdataParser, SpoolWalker};
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn relay_config(spool: &Path, sinks: Vec<SinkConfig>) -> RelayConfig {
        RelayConfig {
            spool_directory: spool.display().to_string(),
            interval_secs: 15,
            replacement_character: '_',
            use_service_desc: false,
            test_mode: false,
            sinks,
        }
    }

    fn sink(name: &str, sink_type: SinkType, params: &[(&str, &str)]) -> SinkConfig {
        SinkConfig {
            name: name.to_string(),
            sink_type,
            enabled: true,
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Accept one connection and return everything it wrote
    fn capture_one_connection(listener: TcpListener) -> JoinHandle<Vec<u8>> {
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            stream.read_to_end(&mut received).await.unwrap();
            received
        })
    }

    /// Spool file → parser → line sink over a real TCP connection.
    ///
    /// The perfdata fixture exercises quoted labels, embedded spaces and
    /// dots, and a Windows drive label with colons and backslashes; the
    /// wire output must carry cleaned labels and unit-stripped values.
    #[tokio::test]
    async fn test_e2e_spool_to_line_protocol() {
        let spool = TempDir::new().unwrap();
        fs::write(
            spool.path().join("service-perfdata.1434331800"),
            "DATATYPE::SERVICEPERFDATA\tTIMET::123\tHOSTNAME::h\t\
             SERVICEPERFDATA::'_var'=9GB;15;15;0;15 '_foo.bar'=2GB;4;4;0;4 \
'_bar baz'=4GB;4;4;0;4 'D:\\_Label:Data__Serial_Number_8c4da61a'=209524MB;2310;4620;0;230998\n",
        )
        .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let capture = capture_one_connection(listener);

        let addr = format!("127.0.0.1:{port}");
        let config = relay_config(
            spool.path(),
            vec![sink("graphite", SinkType::Line, &[("servers", addr.as_str())])],
        );
        let mut dispatcher = Dispatcher::from_config(&config).unwrap();
        let walker = SpoolWalker::new(
            PerfdataParser::new(config.replacement_character, config.use_service_desc),
            config.test_mode,
        );

        let stats = walker
            .process_directory(spool.path(), &mut dispatcher)
            .await
            .unwrap();

        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.records_parsed, 4);
        assert_eq!(stats.records_dispatched, 4);
        assert!(
            !spool.path().join("service-perfdata.1434331800").exists(),
            "delivered file must be deleted"
        );

        let received = String::from_utf8(capture.await.unwrap()).unwrap();
        let lines: Vec<&str> = received.lines().collect();
        assert_eq!(
            lines,
            vec![
                "h.'_var' 9 123",
                "h.'_foo_bar' 2 123",
                "h.'_bar_baz' 4 123",
                "h.'D___Label_Data__Serial_Number_8c4da61a' 209524 123",
            ]
        );
    }

    /// A dead backend leaves the spool file in place for the next scan
    #[tokio::test]
    async fn test_e2e_dead_backend_retains_file() {
        let spool = TempDir::new().unwrap();
        let file = spool.path().join("host-perfdata.1434331800");
        fs::write(
            &file,
            "DATATYPE::HOSTPERFDATA\tTIMET::123\tHOSTNAME::db01\t\
             HOSTPERFDATA::rta=1.066ms;5;10;;\n",
        )
        .unwrap();

        // port 1 refuses connections
        let config = relay_config(
            spool.path(),
            vec![sink(
                "graphite",
                SinkType::Line,
                &[("servers", "127.0.0.1:1"), ("timeout_secs", "1")],
            )],
        );
        let mut dispatcher = Dispatcher::from_config(&config).unwrap();
        let walker = SpoolWalker::new(PerfdataParser::new('_', false), false);

        let stats = walker
            .process_directory(spool.path(), &mut dispatcher)
            .await
            .unwrap();

        assert_eq!(stats.records_parsed, 1);
        assert_eq!(stats.records_dispatched, 0);
        assert!(file.exists(), "undelivered file must survive for retry");

        // second scan with a console sink added: file is picked up again
        let config = relay_config(
            spool.path(),
            vec![sink("echo", SinkType::Console, &[])],
        );
        let mut dispatcher = Dispatcher::from_config(&config).unwrap();
        let stats = walker
            .process_directory(spool.path(), &mut dispatcher)
            .await
            .unwrap();
        assert_eq!(stats.records_dispatched, 1);
        assert!(!file.exists());
    }

    /// One accepting sink is enough to delete even when another rejects
    #[tokio::test]
    async fn test_e2e_partial_sink_failure_still_deletes() {
        let spool = TempDir::new().unwrap();
        let file = spool.path().join("host-perfdata.1434331800");
        fs::write(
            &file,
            "DATATYPE::HOSTPERFDATA\tTIMET::123\tHOSTNAME::db01\t\
             HOSTPERFDATA::rta=1.066ms;5;10;;\n",
        )
        .unwrap();

        let config = relay_config(
            spool.path(),
            vec![
                sink(
                    "graphite",
                    SinkType::Line,
                    &[("servers", "127.0.0.1:1"), ("timeout_secs", "1")],
                ),
                sink("echo", SinkType::Console, &[]),
            ],
        );
        let mut dispatcher = Dispatcher::from_config(&config).unwrap();
        let walker = SpoolWalker::new(PerfdataParser::new('_', false), false);

        let stats = walker
            .process_directory(spool.path(), &mut dispatcher)
            .await
            .unwrap();

        assert_eq!(stats.records_dispatched, 1, "console accepted, line did not");
        assert!(!file.exists(), "best-effort delivery deletes the file");
    }

    /// Config loaded from TOML drives the same pipeline
    #[tokio::test]
    async fn test_e2e_config_from_toml() {
        let spool = TempDir::new().unwrap();
        fs::write(
            spool.path().join("service-perfdata.1"),
            "DATATYPE::SERVICEPERFDATA\tTIMET::123\tHOSTNAME::web01\t\
             SERVICEDESC::load\tSERVICEPERFDATA::load1=0.42 load5=0.37\n",
        )
        .unwrap();

        let toml = format!(
            r#"
spool_directory = "{}"

[[sinks]]
name = "echo"
sink_type = "console"
"#,
            spool.path().display()
        );
        let config =
            config_loader::ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml)
                .unwrap();
        let mut dispatcher = Dispatcher::from_config(&config).unwrap();
        let walker = SpoolWalker::new(
            PerfdataParser::new(config.replacement_character, config.use_service_desc),
            config.test_mode,
        );

        let stats = walker
            .process_directory(Path::new(&config.spool_directory), &mut dispatcher)
            .await
            .unwrap();
        assert_eq!(stats.records_parsed, 2);
        assert_eq!(stats.records_dispatched, 2);
    }

    /// Zero enabled sinks must refuse to construct a dispatcher
    #[test]
    fn test_zero_sink_config_is_fatal() {
        let config = relay_config(Path::new("/tmp/spool"), Vec::new());
        assert!(matches!(
            Dispatcher::from_config(&config),
            Err(contracts::RelayError::NoSinksEnabled)
        ));
    }

    /// Statsd and line sinks can be driven from one dispatch call
    #[tokio::test]
    async fn test_e2e_multi_sink_fanout() {
        let spool = TempDir::new().unwrap();
        fs::write(
            spool.path().join("host-perfdata.7"),
            "DATATYPE::HOSTPERFDATA\tTIMET::123\tHOSTNAME::db01\t\
             HOSTPERFDATA::rta=1.066ms;5;10;; pl=0%;5;10;;\n",
        )
        .unwrap();

        let udp = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let udp_port = udp.local_addr().unwrap().port();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let tcp_port = listener.local_addr().unwrap().port();
        let capture = capture_one_connection(listener);

        let tcp_addr = format!("127.0.0.1:{tcp_port}");
        let udp_addr = format!("127.0.0.1:{udp_port}");
        let config = relay_config(
            spool.path(),
            vec![
                sink("graphite", SinkType::Line, &[("servers", tcp_addr.as_str())]),
                sink("statsd", SinkType::Statsd, &[("servers", udp_addr.as_str())]),
            ],
        );
        let mut dispatcher = Dispatcher::from_config(&config).unwrap();
        let walker = SpoolWalker::new(PerfdataParser::new('_', false), false);

        let stats = walker
            .process_directory(spool.path(), &mut dispatcher)
            .await
            .unwrap();
        assert_eq!(stats.records_parsed, 2);
        assert_eq!(stats.records_dispatched, 4, "both sinks accepted both records");

        let received = String::from_utf8(capture.await.unwrap()).unwrap();
        assert!(received.contains("db01.rta 1.066 123"));
        assert!(received.contains("db01.pl 0 123"));

        let mut buf = [0u8; 512];
        let (len, _) = udp.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"db01.rta:1.066|g");
    }

    /// Records dispatched through the Dispatch trait seam
    #[tokio::test]
    async fn test_dispatch_trait_object_seam() {
        let mut dispatcher = Dispatcher::with_sinks(vec![dispatcher::SinkInstance::Console(
            dispatcher::ConsoleSink::new("echo"),
        )])
        .unwrap();

        let records = PerfdataParser::new('_', false).parse_content(
            "DATATYPE::HOSTPERFDATA\tTIMET::123\tHOSTNAME::db01\tHOSTPERFDATA::rta=1.066ms;;;;\n",
        );
        assert_eq!(dispatcher.dispatch(&records).await, 1);
    }
}
