pub mod location;
pub mod places;

pub use location::{Coordinates, FixedLocation, IpLocation, LocationProvider, UnsupportedLocation};
pub use places::{GeoapifyClient, Place, PlacesQuery, PlacesResponse, PlacesTransport};

use std::time::Duration;

/// Blocking agent shared by the HTTP clients. Non-2xx replies are errors.
pub(crate) fn http_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(true)
        .tls_config(
            ureq::tls::TlsConfig::builder()
                .provider(ureq::tls::TlsProvider::NativeTls)
                .build(),
        )
        .build()
        .into()
}

#[cfg(test)]
pub(crate) mod test_http {
    use std::{
        io::{Read, Write},
        net::TcpListener,
        thread::JoinHandle,
        time::Duration,
    };

    /// Agent without proxy settings so loopback requests stay local.
    pub fn local_agent() -> ureq::Agent {
        ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(5)))
            .proxy(None)
            .build()
            .into()
    }

    /// Serve one canned reply on a loopback port.
    ///
    /// Returns the `host:port` and a handle yielding the request head.
    pub fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr").to_string();
        let reply = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).expect("read request");
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            stream.write_all(reply.as_bytes()).expect("write reply");
            String::from_utf8_lossy(&head).into_owned()
        });
        (addr, handle)
    }
}
