//! Minimal HTTP/1.1 server for integration tests that speaks the
//! `/api/light-data` paging contract.
//!
//! Serves `total` synthetic brightness samples. Records are generated from
//! their index, so a test can check that the accumulated list is exactly the
//! prefix it asked for. Every request's `(offset, limit)` is logged.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct PagedServerOptions {
    /// Answer 500 for any request whose offset is at or past this one.
    pub fail_from_offset: Option<u64>,
    /// Leave `total` out of the pagination object.
    pub hide_total: bool,
    /// Hold the first request at this offset for the given time before answering.
    pub stall_once: Option<(u64, Duration)>,
}

pub type RequestLog = Arc<Mutex<Vec<(u64, u32)>>>;

pub struct PagedServer {
    /// Base URL including the `/api` prefix, e.g. "http://127.0.0.1:12345/api".
    pub base_url: String,
    pub requests: RequestLog,
}

impl PagedServer {
    pub fn offsets(&self) -> Vec<u64> {
        self.requests.lock().unwrap().iter().map(|(o, _)| *o).collect()
    }
}

/// Brightness of the record at `index`; lets tests verify ordering.
pub fn brightness_at(index: u64) -> f64 {
    index as f64 / 10.0
}

pub fn start(total: u64) -> PagedServer {
    start_with_options(total, PagedServerOptions::default())
}

pub fn start_with_options(total: u64, opts: PagedServerOptions) -> PagedServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests: RequestLog = Arc::default();
    let log = Arc::clone(&requests);
    let stalled = Arc::new(AtomicBool::new(false));
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let log = Arc::clone(&log);
            let stalled = Arc::clone(&stalled);
            thread::spawn(move || handle(stream, total, opts, &log, &stalled));
        }
    });
    PagedServer {
        base_url: format!("http://127.0.0.1:{}/api", port),
        requests,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    total: u64,
    opts: PagedServerOptions,
    log: &RequestLog,
    stalled: &AtomicBool,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    if path != "/api/light-data" {
        respond(&mut stream, "404 Not Found", r#"{"error":"Not found"}"#);
        return;
    }

    let mut start_time = None;
    let mut end_time = None;
    let mut limit = None;
    let mut offset = None;
    for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
        match k.as_ref() {
            "start_time" => start_time = Some(v.into_owned()),
            "end_time" => end_time = Some(v.into_owned()),
            "limit" => limit = v.parse::<u32>().ok(),
            "offset" => offset = v.parse::<u64>().ok(),
            _ => {}
        }
    }
    let (Some(start_time), Some(end_time)) = (start_time, end_time) else {
        respond(
            &mut stream,
            "400 Bad Request",
            r#"{"error":"start_time and end_time parameters are required"}"#,
        );
        return;
    };
    let limit = match limit {
        Some(l) if (1..=10_000).contains(&l) => l,
        _ => {
            respond(
                &mut stream,
                "400 Bad Request",
                r#"{"error":"limit must be a number between 1 and 10000"}"#,
            );
            return;
        }
    };
    let offset = offset.unwrap_or(0);
    log.lock().unwrap().push((offset, limit));

    if let Some((at, delay)) = opts.stall_once {
        if offset == at && !stalled.swap(true, Ordering::SeqCst) {
            thread::sleep(delay);
        }
    }

    if opts.fail_from_offset.is_some_and(|f| offset >= f) {
        respond(
            &mut stream,
            "500 Internal Server Error",
            r#"{"error":"Internal server error"}"#,
        );
        return;
    }

    let end = (offset + u64::from(limit)).min(total);
    let data: Vec<serde_json::Value> = (offset.min(total)..end)
        .map(|i| {
            serde_json::json!({
                "time": start_time,
                "longitude": 121.0 + (i % 100) as f64 / 100.0,
                "latitude": 24.0,
                "brightness": brightness_at(i),
            })
        })
        .collect();
    let mut pagination = serde_json::json!({
        "limit": limit,
        "offset": offset,
        "has_more": offset + u64::from(limit) < total,
    });
    if !opts.hide_total {
        pagination["total"] = serde_json::json!(total);
    }
    let body = serde_json::json!({
        "data": data,
        "pagination": pagination,
        "time_range": { "start": start_time, "end": end_time },
    });
    respond(&mut stream, "200 OK", &body.to_string());
}

fn respond(stream: &mut std::net::TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body.as_bytes());
}
