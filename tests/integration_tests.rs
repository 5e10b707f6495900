use linehound::config::Config;
use linehound::engine::Algorithm;
use linehound::error::ServerError;
use linehound::init::build_processor;
use linehound::logger::QueryLogger;
use linehound::server::SearchServer;
use linehound::stats::StatsCollector;
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

fn reference_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn test_config(path: &Path) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        reference_path: path.display().to_string(),
        reread_on_query: false,
        ..Config::default()
    }
}

async fn spawn_server(config: Config) -> SocketAddr {
    let stats = StatsCollector::new(config.stats.clone());
    let logger = QueryLogger::new(config.logging.clone());
    let (source, processor) = build_processor(&config);
    source.preload().await.unwrap();
    let server = SearchServer::bind(config, processor, stats, logger)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

/// One query per connection: send the payload, read until the server closes.
async fn query(addr: SocketAddr, payload: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(payload).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

async fn read_line(stream: &mut TcpStream) -> String {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = stream.read(&mut byte).await.unwrap();
        if n == 0 {
            break;
        }
        line.push(byte[0]);
        if byte[0] == b'\n' {
            break;
        }
    }
    String::from_utf8(line).unwrap()
}

#[tokio::test]
async fn test_exists_and_not_found() {
    let file = reference_file("alpha\nbeta\ngamma\n");
    let addr = spawn_server(test_config(file.path())).await;

    assert_eq!(query(addr, b"beta\n").await, "STRING EXISTS\n");
    assert_eq!(query(addr, b"delta\n").await, "STRING NOT FOUND\n");
    // Empty query matches nothing in a corpus without empty lines.
    assert_eq!(query(addr, b"\n").await, "STRING NOT FOUND\n");
    // Full-line semantics: a substring of a line is not a match.
    assert_eq!(query(addr, b"bet\n").await, "STRING NOT FOUND\n");
}

#[tokio::test]
async fn test_every_algorithm_end_to_end() {
    let file = reference_file("alpha\nbeta\ngamma\n");
    for algorithm in Algorithm::ALL {
        let config = Config {
            algorithm,
            ..test_config(file.path())
        };
        let addr = spawn_server(config).await;
        assert_eq!(
            query(addr, b"beta\n").await,
            "STRING EXISTS\n",
            "{algorithm:?}"
        );
        assert_eq!(
            query(addr, b"delta\n").await,
            "STRING NOT FOUND\n",
            "{algorithm:?}"
        );
    }
}

#[tokio::test]
async fn test_payload_framing_is_stripped() {
    let file = reference_file("alpha\nbeta\ngamma\n");
    let addr = spawn_server(test_config(file.path())).await;

    assert_eq!(query(addr, b"beta").await, "STRING EXISTS\n");
    assert_eq!(query(addr, b"beta\r\n").await, "STRING EXISTS\n");
    assert_eq!(query(addr, b"beta\0\0\0").await, "STRING EXISTS\n");
}

#[tokio::test]
async fn test_keep_alive_serves_queries_in_order() {
    let file = reference_file("alpha\nbeta\ngamma\n");
    let config = Config {
        keep_alive: true,
        ..test_config(file.path())
    };
    let addr = spawn_server(config).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"alpha\n").await.unwrap();
    assert_eq!(read_line(&mut stream).await, "STRING EXISTS\n");
    stream.write_all(b"delta\n").await.unwrap();
    assert_eq!(read_line(&mut stream).await, "STRING NOT FOUND\n");
    stream.write_all(b"gamma\n").await.unwrap();
    assert_eq!(read_line(&mut stream).await, "STRING EXISTS\n");
}

#[tokio::test]
async fn test_reread_policy_observes_file_edits() {
    let file = reference_file("alpha\nbeta\n");
    let config = Config {
        reread_on_query: true,
        ..test_config(file.path())
    };
    let addr = spawn_server(config).await;

    assert_eq!(query(addr, b"omega\n").await, "STRING NOT FOUND\n");
    std::fs::write(file.path(), "alpha\nbeta\nomega\n").unwrap();
    assert_eq!(query(addr, b"omega\n").await, "STRING EXISTS\n");
}

#[tokio::test]
async fn test_cached_policy_ignores_file_edits() {
    let file = reference_file("alpha\nbeta\n");
    let addr = spawn_server(test_config(file.path())).await;

    std::fs::write(file.path(), "alpha\nbeta\nomega\n").unwrap();
    assert_eq!(query(addr, b"omega\n").await, "STRING NOT FOUND\n");
    assert_eq!(query(addr, b"beta\n").await, "STRING EXISTS\n");
}

#[tokio::test]
async fn test_cached_policy_unreadable_path_fails_startup() {
    let config = test_config(Path::new("/nonexistent/reference.txt"));
    let (source, _processor) = build_processor(&config);
    let err = source.preload().await.unwrap_err();
    assert!(matches!(err, ServerError::SourceUnavailable { .. }));
}

#[tokio::test]
async fn test_reread_policy_source_failure_is_per_query() {
    let file = reference_file("alpha\n");
    let config = Config {
        reread_on_query: true,
        ..test_config(file.path())
    };
    let addr = spawn_server(config).await;
    let path = file.path().to_path_buf();

    assert_eq!(query(addr, b"alpha\n").await, "STRING EXISTS\n");

    // Remove the backing file: queries fail, the server keeps accepting.
    drop(file);
    assert_eq!(query(addr, b"alpha\n").await, "SERVER ERROR\n");

    std::fs::write(&path, "alpha\n").unwrap();
    assert_eq!(query(addr, b"alpha\n").await, "STRING EXISTS\n");
    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_oversized_query_rejected() {
    let file = reference_file("alpha\nbeta\n");
    let config = Config {
        max_query_len: 8,
        ..test_config(file.path())
    };
    let addr = spawn_server(config).await;

    // Nine bytes: fills the read buffer's one byte of headroom past the
    // eight-byte limit.
    assert_eq!(query(addr, b"012345678").await, "STRING NOT FOUND\n");
    // At or under the limit still matches normally.
    assert_eq!(query(addr, b"beta\n").await, "STRING EXISTS\n");
}

#[tokio::test]
async fn test_invalid_utf8_rejected() {
    let file = reference_file("alpha\nbeta\n");
    let addr = spawn_server(test_config(file.path())).await;

    assert_eq!(query(addr, &[0xff, 0xfe, 0x0a]).await, "STRING NOT FOUND\n");
}

#[tokio::test]
async fn test_concurrent_connections() {
    let file = reference_file("alpha\nbeta\ngamma\n");
    let addr = spawn_server(test_config(file.path())).await;

    let mut handles = Vec::new();
    for i in 0..16 {
        handles.push(tokio::spawn(async move {
            let payload = if i % 2 == 0 { "beta\n" } else { "delta\n" };
            let expected = if i % 2 == 0 {
                "STRING EXISTS\n"
            } else {
                "STRING NOT FOUND\n"
            };
            assert_eq!(query(addr, payload.as_bytes()).await, expected);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_bind_failure_is_fatal() {
    let file = reference_file("alpha\n");
    let config = Config {
        host: "255.255.255.255".to_string(),
        port: 1,
        ..test_config(file.path())
    };
    let stats = StatsCollector::new(config.stats.clone());
    let logger = QueryLogger::new(config.logging.clone());
    let (source, processor) = build_processor(&config);
    source.preload().await.unwrap();
    let err = SearchServer::bind(config, processor, stats, logger)
        .await
        .unwrap_err();
    assert!(matches!(err, ServerError::ListenerBindFailed { .. }));
}
