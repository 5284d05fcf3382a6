//! End-to-end lifecycle tests: argv dispatch, payload decoding, capability
//! wiring, cleanup, and the documented stream outputs, all driven through
//! `Engine::execute_with` with injected streams.

use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use modinput::{
    Argument, DataType, Engine, EngineIo, Event, EventWriteError, EventWriter, FnInput,
    InputSettings, InputSpecSet, RunContext, RunError, ValidationError,
};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn io_with(stdin: &str) -> (EngineIo, SharedBuf, SharedBuf) {
    let stdout = SharedBuf::default();
    let stderr = SharedBuf::default();
    let io = EngineIo {
        stdin: Box::new(Cursor::new(stdin.as_bytes().to_vec())),
        stdout: Box::new(stdout.clone()),
        stderr: Box::new(stderr.clone()),
    };
    (io, stdout, stderr)
}

fn argv(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

fn local_settings() -> InputSettings {
    InputSettings {
        use_kvstore_checkpoint: false,
        use_hec_event_writer: false,
        ..InputSettings::default()
    }
}

fn input_payload(server_uri: &str, checkpoint_dir: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<input>
  <server_host>collector-01</server_host>
  <server_uri>{server_uri}</server_uri>
  <session_key>s3ss10n</session_key>
  <checkpoint_dir>{checkpoint_dir}</checkpoint_dir>
  <configuration>
    <stanza name="demo://alpha">
      <param name="interval">60</param>
    </stanza>
    <stanza name="demo://beta">
      <param name="interval">300</param>
    </stanza>
  </configuration>
</input>"#
    )
}

fn validation_payload(server_uri: &str) -> String {
    format!(
        r#"<items>
  <server_host>collector-01</server_host>
  <server_uri>{server_uri}</server_uri>
  <session_key>s3ss10n</session_key>
  <checkpoint_dir>/tmp/ckpt</checkpoint_dir>
  <item name="demo://proposed">
    <param name="interval">60</param>
  </item>
</items>"#
    )
}

/// Minimal HTTP server answering every request with the given status line.
async fn spawn_http_server(status: &'static str) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 2048];
                let _ = sock.read(&mut buf).await;
                let resp =
                    format!("HTTP/1.1 {status}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
                let _ = sock.write_all(resp.as_bytes()).await;
            });
        }
    });
    addr
}

/// An address nothing is listening on.
async fn refused_uri() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn run_mode_invokes_run_once_with_parsed_stanzas() {
    let calls = Arc::new(AtomicU32::new(0));
    let seen: Arc<Mutex<Option<InputSpecSet>>> = Arc::new(Mutex::new(None));

    let input = {
        let calls = calls.clone();
        let seen = seen.clone();
        FnInput::builder("ta_test", "test", "Test input", "Test modular input")
            .settings(local_settings())
            .run(move |_ctx, inputs| {
                let calls = calls.clone();
                let seen = seen.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    *seen.lock().unwrap() = Some(inputs);
                    Ok(())
                }
            })
            .unwrap()
    };
    let engine = Engine::new(input).unwrap();

    let checkpoint_dir = tempfile::tempdir().unwrap();
    let payload = input_payload(
        "https://127.0.0.1:8089",
        checkpoint_dir.path().to_str().unwrap(),
    );
    let (io, stdout, stderr) = io_with(&payload);

    let code = engine.execute_with(&argv(&["prog"]), io).await;
    assert_eq!(code, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(stdout.contents().is_empty());
    assert!(stderr.contents().is_empty());

    let inputs = seen.lock().unwrap().take().unwrap();
    assert_eq!(inputs.len(), 2);
    assert_eq!(
        inputs.get("demo://alpha").unwrap().param("interval"),
        Some("60")
    );
    assert_eq!(
        inputs.get("demo://beta").unwrap().param("interval"),
        Some("300")
    );
}

#[tokio::test]
async fn run_mode_failure_still_releases_writer_and_monitor() {
    let writer_slot: Arc<Mutex<Option<Arc<dyn EventWriter>>>> = Arc::new(Mutex::new(None));
    let ctx_slot: Arc<Mutex<Option<Arc<RunContext>>>> = Arc::new(Mutex::new(None));

    let input = {
        let writer_slot = writer_slot.clone();
        let ctx_slot = ctx_slot.clone();
        FnInput::builder("ta_test", "test", "Test input", "Test modular input")
            .settings(local_settings())
            .run(move |ctx, _inputs| {
                let writer_slot = writer_slot.clone();
                let ctx_slot = ctx_slot.clone();
                async move {
                    let writer = ctx.event_writer().await?.clone();
                    *writer_slot.lock().unwrap() = Some(writer);
                    ctx.register_orphan_handler(|| {});
                    assert!(ctx.orphan_monitor().is_running());
                    *ctx_slot.lock().unwrap() = Some(ctx);
                    Err(RunError::failed("collection blew up"))
                }
            })
            .unwrap()
    };
    let engine = Engine::new(input).unwrap();

    let checkpoint_dir = tempfile::tempdir().unwrap();
    let payload = input_payload(
        "https://127.0.0.1:8089",
        checkpoint_dir.path().to_str().unwrap(),
    );
    let (io, _stdout, _stderr) = io_with(&payload);

    let code = engine.execute_with(&argv(&["prog"]), io).await;
    assert_eq!(code, 1);

    // Cleanup ran even though do_run failed: the writer rejects further
    // writes and the orphan monitor is stopped.
    let writer = writer_slot.lock().unwrap().take().unwrap();
    assert!(matches!(
        writer.write(Event::new("late")).await,
        Err(EventWriteError::Closed)
    ));
    let ctx = ctx_slot.lock().unwrap().take().unwrap();
    assert!(!ctx.orphan_monitor().is_running());
}

#[tokio::test]
async fn run_mode_rejects_malformed_payload() {
    let calls = Arc::new(AtomicU32::new(0));
    let input = {
        let calls = calls.clone();
        FnInput::builder("ta_test", "test", "Test input", "Test modular input")
            .settings(local_settings())
            .run(move |_ctx, _inputs| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .unwrap()
    };
    let engine = Engine::new(input).unwrap();

    let (io, stdout, stderr) = io_with("<input><server_host>oops</input>");
    let code = engine.execute_with(&argv(&["prog"]), io).await;

    assert_eq!(code, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(stdout.contents().is_empty());
    assert!(stderr.contents().is_empty());
}

#[tokio::test]
async fn scheme_mode_emits_ordered_arguments() {
    let calls = Arc::new(AtomicU32::new(0));
    let input = {
        let calls = calls.clone();
        FnInput::builder("ta_test", "test", "Test input", "Test modular input")
            .settings(local_settings())
            .arguments(vec![
                Argument::new("endpoint").with_title("Feed endpoint"),
                Argument::new("interval").with_data_type(DataType::Number),
            ])
            .run(move |_ctx, _inputs| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .unwrap()
    };
    let engine = Engine::new(input).unwrap();

    let (io, stdout, stderr) = io_with("");
    let code = engine.execute_with(&argv(&["prog", "--SCHEME"]), io).await;

    assert_eq!(code, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(stderr.contents().is_empty());

    let xml = stdout.contents();
    assert!(xml.starts_with("<scheme><title>Test input</title>"));
    assert!(xml.contains("<streaming_mode>xml</streaming_mode>"));
    let endpoint_at = xml.find(r#"<arg name="endpoint">"#).unwrap();
    let interval_at = xml.find(r#"<arg name="interval">"#).unwrap();
    assert!(endpoint_at < interval_at, "argument order must be preserved");
}

#[tokio::test]
async fn validate_mode_failure_writes_error_document() {
    let input = FnInput::builder("ta_test", "test", "Test input", "Test modular input")
        .settings(local_settings())
        .validate(|_metadata, _request| Err(ValidationError::new("bad value")))
        .run(|_ctx, _inputs| async move { Ok(()) })
        .unwrap();
    let engine = Engine::new(input).unwrap();

    let (io, stdout, stderr) = io_with(&validation_payload("https://127.0.0.1:8089"));
    let code = engine
        .execute_with(&argv(&["prog", "--validate-arguments"]), io)
        .await;

    assert_eq!(code, 1);
    assert!(stdout.contents().is_empty());
    assert_eq!(
        stderr.contents(),
        "<error><message>bad value</message></error>"
    );
}

#[tokio::test]
async fn validate_mode_success_is_silent() {
    let input = FnInput::builder("ta_test", "test", "Test input", "Test modular input")
        .settings(local_settings())
        .run(|_ctx, _inputs| async move { Ok(()) })
        .unwrap();
    let engine = Engine::new(input).unwrap();

    let (io, stdout, stderr) = io_with(&validation_payload("https://127.0.0.1:8089"));
    let code = engine
        .execute_with(&argv(&["prog", "--validate-arguments"]), io)
        .await;

    assert_eq!(code, 0);
    assert!(stdout.contents().is_empty());
    assert!(stderr.contents().is_empty());
}

#[tokio::test]
async fn invalid_invocation_exits_one_without_stream_output() {
    let calls = Arc::new(AtomicU32::new(0));
    let input = {
        let calls = calls.clone();
        FnInput::builder("ta_test", "test", "Test input", "Test modular input")
            .settings(local_settings())
            .run(move |_ctx, _inputs| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .unwrap()
    };
    let engine = Engine::new(input).unwrap();

    let (io, stdout, stderr) = io_with("");
    let code = engine.execute_with(&argv(&["prog", "--bogus"]), io).await;

    assert_eq!(code, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(stdout.contents().is_empty());
    assert!(stderr.contents().is_empty());
}

#[tokio::test]
async fn unavailable_collector_falls_back_to_classic_writer() {
    // The management API knows nothing about the requested collector input.
    let addr = spawn_http_server("404 Not Found").await;

    let writer_name: Arc<Mutex<Option<&'static str>>> = Arc::new(Mutex::new(None));
    let input = {
        let writer_name = writer_name.clone();
        FnInput::builder("ta_test", "test", "Test input", "Test modular input")
            .settings(InputSettings {
                use_kvstore_checkpoint: false,
                use_hec_event_writer: true,
                hec_input_name: "test_collector".to_string(),
                ..InputSettings::default()
            })
            .run(move |ctx, _inputs| {
                let writer_name = writer_name.clone();
                async move {
                    let writer = ctx.event_writer().await?;
                    *writer_name.lock().unwrap() = Some(writer.name());
                    Ok(())
                }
            })
            .unwrap()
    };
    let engine = Engine::new(input).unwrap();

    let checkpoint_dir = tempfile::tempdir().unwrap();
    let payload = input_payload(
        &format!("http://{addr}"),
        checkpoint_dir.path().to_str().unwrap(),
    );
    let (io, _stdout, _stderr) = io_with(&payload);

    let code = engine.execute_with(&argv(&["prog"]), io).await;
    assert_eq!(code, 0);
    assert_eq!(*writer_name.lock().unwrap(), Some("classic"));
}

#[tokio::test]
async fn collector_transport_error_aborts_the_run() {
    // Connection refused is not the "unavailable" class: no fallback.
    let uri = refused_uri().await;

    let input = FnInput::builder("ta_test", "test", "Test input", "Test modular input")
        .settings(InputSettings {
            use_kvstore_checkpoint: false,
            use_hec_event_writer: true,
            hec_input_name: "test_collector".to_string(),
            ..InputSettings::default()
        })
        .run(|ctx, _inputs| async move {
            let writer = ctx.event_writer().await?;
            writer.write(Event::new("never delivered")).await?;
            Ok(())
        })
        .unwrap();
    let engine = Engine::new(input).unwrap();

    let checkpoint_dir = tempfile::tempdir().unwrap();
    let payload = input_payload(&uri, checkpoint_dir.path().to_str().unwrap());
    let (io, stdout, _stderr) = io_with(&payload);

    let code = engine.execute_with(&argv(&["prog"]), io).await;
    assert_eq!(code, 1);
    assert!(stdout.contents().is_empty());
}

#[tokio::test]
async fn checkpointer_is_memoized_and_usable() {
    let stable = Arc::new(AtomicBool::new(false));
    let round_tripped = Arc::new(AtomicBool::new(false));

    let input = {
        let stable = stable.clone();
        let round_tripped = round_tripped.clone();
        FnInput::builder("ta_test", "test", "Test input", "Test modular input")
            .settings(local_settings())
            .run(move |ctx, _inputs| {
                let stable = stable.clone();
                let round_tripped = round_tripped.clone();
                async move {
                    let first = ctx.checkpointer().await?.clone();
                    let second = ctx.checkpointer().await?.clone();
                    stable.store(Arc::ptr_eq(&first, &second), Ordering::SeqCst);

                    first
                        .save("demo://alpha", serde_json::json!({"cursor": 7}))
                        .await?;
                    let loaded = second.get("demo://alpha").await?;
                    round_tripped.store(
                        loaded == Some(serde_json::json!({"cursor": 7})),
                        Ordering::SeqCst,
                    );
                    Ok(())
                }
            })
            .unwrap()
    };
    let engine = Engine::new(input).unwrap();

    let checkpoint_dir = tempfile::tempdir().unwrap();
    let payload = input_payload(
        "https://127.0.0.1:8089",
        checkpoint_dir.path().to_str().unwrap(),
    );
    let (io, _stdout, _stderr) = io_with(&payload);

    let code = engine.execute_with(&argv(&["prog"]), io).await;
    assert_eq!(code, 0);
    assert!(stable.load(Ordering::SeqCst));
    assert!(round_tripped.load(Ordering::SeqCst));
}
