use axum::body::Body;
use axum::http::{Request, StatusCode};
use sheetchart::chart::ChartKind;
use sheetchart::column_types::ColumnType;
use sheetchart::error::IntakeError;
use sheetchart::protocol::UploadResponse;
use sheetchart::registry::SelectorRole;
use sheetchart::server::{self, ServerConfig};
use sheetchart::session::Session;
use sheetchart::transport::{HttpTransport, LocalTransport, SelectedFile, UploadTransport};
use sheetchart::{OutputFormat, RenderOptions};
use std::fs;
use std::process::Command;
use tower::ServiceExt;

const SALES_CSV: &str = "city,sales\nA,10\nA,20\nB,5\n";
const BOUNDARY: &str = "sheetchart-test-boundary";

/// Helper function to run sheetchart with arguments
fn run_sheetchart(args: &[&str]) -> Result<Vec<u8>, String> {
    let output = Command::new(env!("CARGO_BIN_EXE_sheetchart"))
        .args(args)
        .output()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

/// Check if bytes are a valid PNG
fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

/// Write `content` to a scratch file named `name`
fn scratch_file(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

/// Two-column workbook: a text header row then (region, revenue) rows
fn sales_xlsx() -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "region").unwrap();
    worksheet.write_string(0, 1, "revenue").unwrap();
    for (row, (region, revenue)) in [("North", 100.0), ("South", 40.0), ("North", 50.0)]
        .iter()
        .enumerate()
    {
        worksheet.write_string(row as u32 + 1, 0, *region).unwrap();
        worksheet.write_number(row as u32 + 1, 1, *revenue).unwrap();
    }
    workbook.save_to_buffer().unwrap()
}

/// multipart/form-data body with a single file field
fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
        BOUNDARY, field, file_name
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn post_upload(field: &str, file_name: &str, content: &[u8]) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, file_name, content)))
        .unwrap();

    let response = server::router(&ServerConfig::default())
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// CLI tests

#[test]
fn test_end_to_end_bar_chart() {
    let dir = tempfile::tempdir().unwrap();
    let path = scratch_file(&dir, "sales.csv", SALES_CSV.as_bytes());
    let result = run_sheetchart(&["render", &path, "--kind", "bar"]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()), "Output is not a valid PNG");
}

#[test]
fn test_end_to_end_pie_chart_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = scratch_file(&dir, "sales.csv", SALES_CSV.as_bytes());
    let out = dir.path().join("chart.png");
    let result = run_sheetchart(&[
        "render",
        &path,
        "--kind",
        "pie",
        "--output",
        out.to_str().unwrap(),
    ]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&fs::read(&out).unwrap()));
}

#[test]
fn test_end_to_end_line_chart_svg() {
    let dir = tempfile::tempdir().unwrap();
    let path = scratch_file(&dir, "sales.csv", SALES_CSV.as_bytes());
    let result = run_sheetchart(&["render", &path, "--kind", "line", "--format", "svg"]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(String::from_utf8(result.unwrap()).unwrap().contains("<svg"));
}

#[test]
fn test_end_to_end_json_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = scratch_file(&dir, "sales.csv", SALES_CSV.as_bytes());
    let result = run_sheetchart(&["render", &path, "--kind", "pie", "--format", "json"]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());

    let config: serde_json::Value = serde_json::from_slice(&result.unwrap()).unwrap();
    assert_eq!(config["type"], "pie");
    assert_eq!(config["data"]["labels"], serde_json::json!(["A", "B"]));
    assert_eq!(config["data"]["datasets"][0]["data"], serde_json::json!([30.0, 5.0]));
    assert_eq!(config["options"]["tooltips"][0], "A: 30 (86%)");
}

#[test]
fn test_end_to_end_explicit_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = scratch_file(&dir, "t.csv", b"region,units,price\nN,1,10\nS,3,20\nN,5,30\n");
    let result = run_sheetchart(&[
        "render", &path, "--key", "region", "--value", "units", "--format", "json",
    ]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());

    let config: serde_json::Value = serde_json::from_slice(&result.unwrap()).unwrap();
    assert_eq!(config["data"]["datasets"][0]["data"], serde_json::json!([3.0, 3.0]));
    assert_eq!(config["options"]["title"], "units by region");
}

#[test]
fn test_end_to_end_rejects_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = scratch_file(&dir, "report.pdf", b"%PDF-1.4");
    let result = run_sheetchart(&["render", &path]);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Please upload an Excel (.xlsx) or CSV (.csv) file."));
}

#[test]
fn test_end_to_end_column_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = scratch_file(&dir, "sales.csv", SALES_CSV.as_bytes());
    let result = run_sheetchart(&["render", &path, "--value", "nonexistent"]);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("not found"));
}

#[test]
fn test_end_to_end_header_only_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = scratch_file(&dir, "empty.csv", b"city,sales\n");
    let result = run_sheetchart(&["render", &path]);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("no rows"));
}

#[test]
fn test_end_to_end_inspect() {
    let dir = tempfile::tempdir().unwrap();
    let path = scratch_file(&dir, "sales.csv", SALES_CSV.as_bytes());
    let result = run_sheetchart(&["inspect", &path]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());

    let text = String::from_utf8(result.unwrap()).unwrap();
    assert!(text.contains("city\tText"));
    assert!(text.contains("sales\tNumeric"));
    assert!(text.contains("rows: 3"));
    assert!(text.contains("default y-axis: sales"));
}

// Library tests

#[tokio::test]
async fn test_xlsx_session_end_to_end() {
    let mut session = Session::new();
    session.select_file(Some(SelectedFile::new("sales.xlsx", sales_xlsx())));
    let data = session.upload(&LocalTransport).await.unwrap();
    assert_eq!(data.columns, vec!["region", "revenue"]);
    assert_eq!(
        data.column_types,
        vec![
            ("region".to_string(), Some(ColumnType::Text)),
            ("revenue".to_string(), Some(ColumnType::Numeric)),
        ]
    );

    session.set_chart_kind(ChartKind::Pie);
    let chart = session.generate().unwrap().unwrap();
    assert_eq!(chart.config().labels(), &["North", "South"]);
    assert_eq!(chart.config().values(), &[150.0, 40.0]);

    let svg = chart
        .to_image(&RenderOptions {
            format: OutputFormat::Svg,
            ..RenderOptions::default()
        })
        .unwrap();
    assert!(String::from_utf8(svg).unwrap().contains("<svg"));
}

#[tokio::test]
async fn test_new_upload_replaces_dataset() {
    let mut session = Session::new();
    session.select_file(Some(SelectedFile::new("sales.csv", SALES_CSV.as_bytes().to_vec())));
    session.upload(&LocalTransport).await.unwrap();
    session.generate().unwrap();

    session.select_file(Some(SelectedFile::new("sales.xlsx", sales_xlsx())));
    session.upload(&LocalTransport).await.unwrap();
    assert_eq!(
        session.registry().selector(SelectorRole::XAxis).options(),
        &["region", "revenue"]
    );

    let chart = session.generate().unwrap().unwrap();
    assert_eq!(chart.config().values(), &[75.0, 40.0]);
    assert_eq!(session.live_charts(), 1);
}

// Server tests

#[tokio::test]
async fn test_server_parses_csv() {
    let (status, body) = post_upload("file", "sales.csv", SALES_CSV.as_bytes()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "File successfully processed");
    assert_eq!(body["columns"], serde_json::json!(["city", "sales"]));
    assert_eq!(body["column_types"]["city"], "T");
    assert_eq!(body["column_types"]["sales"], "N");
    assert_eq!(body["data"][0]["city"], "A");
    assert_eq!(body["data"][0]["sales"], 10.0);
}

#[tokio::test]
async fn test_server_parses_xlsx() {
    let (status, body) = post_upload("file", "sales.xlsx", &sales_xlsx()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["columns"], serde_json::json!(["region", "revenue"]));
    assert_eq!(body["column_types"]["revenue"], "N");
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_server_no_file_part() {
    let (status, body) = post_upload("attachment", "sales.csv", SALES_CSV.as_bytes()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file part");
}

#[tokio::test]
async fn test_server_unsupported_type() {
    let (status, body) = post_upload("file", "notes.txt", b"hello").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "File type not supported. Please upload .xlsx or .csv files."
    );
}

#[tokio::test]
async fn test_http_transport_against_live_server() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let config = ServerConfig::default();
        server::serve(listener, &config).await
    });

    let transport = HttpTransport::new(&format!("http://{}", addr)).unwrap();

    // Server-side rejection comes back as a structured failure
    let rejected = transport
        .upload(&SelectedFile::new("notes.txt", b"hello".to_vec()))
        .await
        .unwrap();
    assert!(matches!(rejected, UploadResponse::Failure { .. }));

    let mut session = Session::new();
    session.select_file(Some(SelectedFile::new("sales.csv", SALES_CSV.as_bytes().to_vec())));
    session.upload(&transport).await.unwrap();
    session.set_chart_kind(ChartKind::Bar);
    let chart = session.generate().unwrap().unwrap();
    assert_eq!(chart.config().values(), &[15.0, 5.0]);
}

#[tokio::test]
async fn test_http_transport_unreachable_server() {
    // Bind then drop to get a port nothing listens on
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let transport = HttpTransport::new(&format!("http://{}", addr)).unwrap();

    let mut session = Session::new();
    session.select_file(Some(SelectedFile::new("sales.csv", SALES_CSV.as_bytes().to_vec())));
    let result = session.upload(&transport).await;
    assert!(matches!(result, Err(IntakeError::Transport(_))));
    assert!(session.intake().can_submit());
    assert!(session.data().is_none());
}
