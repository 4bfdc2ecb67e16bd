//! HTTP and HTTPS checks.
//!
//! Issues a HEAD request against the node's address and compares the status
//! code against the configured set of acceptable codes. Redirects are not
//! followed so that 3xx codes can be matched directly.

use std::net::IpAddr;

use reqwest::redirect::Policy;
use reqwest::{header, Client};

use crate::healthcheck::result::{ProbeError, ProbeOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpScheme {
    Http,
    Https,
}

impl HttpScheme {
    fn as_str(self) -> &'static str {
        match self {
            HttpScheme::Http => "http",
            HttpScheme::Https => "https",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpProbe {
    target: IpAddr,
    scheme: HttpScheme,
    path: String,
    host: Option<String>,
    port: Option<u16>,
    ok_codes: Vec<u16>,
    client: Client,
}

impl HttpProbe {
    pub fn new(
        target: IpAddr,
        scheme: HttpScheme,
        path: String,
        host: Option<String>,
        port: Option<u16>,
        ok_codes: Vec<u16>,
    ) -> Result<Self, reqwest::Error> {
        // Self-signed certificates are the norm on backends probed by bare
        // IP address, so certificate validation is off for HTTPS.
        let client = Client::builder()
            .redirect(Policy::none())
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { target, scheme, path, host, port, ok_codes, client })
    }

    fn request_url(&self) -> String {
        let authority = match self.target {
            IpAddr::V4(ip) => ip.to_string(),
            IpAddr::V6(ip) => format!("[{}]", ip),
        };
        match self.port {
            Some(port) => format!("{}://{}:{}{}", self.scheme.as_str(), authority, port, self.path),
            None => format!("{}://{}{}", self.scheme.as_str(), authority, self.path),
        }
    }

    pub async fn run(&self) -> ProbeOutcome {
        let mut request = self.client.head(self.request_url());
        if let Some(host) = &self.host {
            request = request.header(header::HOST, host);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                if self.ok_codes.contains(&status) {
                    ProbeOutcome::good()
                } else {
                    ProbeOutcome::bad(ProbeError::HttpStatus(status))
                }
            }
            Err(e) if e.is_timeout() => ProbeOutcome::bad(ProbeError::Timeout),
            Err(e) => ProbeOutcome::error(ProbeError::Transport(e.to_string())),
        }
    }
}
