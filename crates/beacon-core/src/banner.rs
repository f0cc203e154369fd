// Human-readable startup banner

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket},
    path::{Path, PathBuf},
};

use log::debug;

use crate::{config::Config, filesystem::Filesystem};

const RULE_WIDTH: usize = 65;

/// Best-effort detection of the address other machines can reach this one on.
///
/// Connecting a UDP socket sends no packets, it only makes the OS pick the outbound interface.
pub fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(("8.8.8.8", 80)).ok()?;
    let ip = socket.local_addr().ok()?.ip();

    if ip.is_unspecified() {
        debug!("Outbound interface has no usable address");
        return None;
    }

    Some(ip)
}

/// JavaScript files at the top level of the document root, sorted by name
pub fn javascript_files(filesystem: &dyn Filesystem) -> Vec<String> {
    let files = match filesystem.list_files(PathBuf::new()) {
        Ok(files) => files,
        Err(e) => {
            debug!("Failed to list the document root: {e}");
            return Vec::new();
        }
    };

    let mut scripts: Vec<String> = files
        .iter()
        .filter(|path| path.extension().is_some_and(|ext| ext == "js"))
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().to_string())
        .collect();
    scripts.sort();
    scripts
}

pub struct Banner<'a> {
    config: &'a Config,
    address: SocketAddr,
    document_root: &'a Path,
    network_ip: Option<IpAddr>,
    scripts: Vec<String>,
}

impl<'a> Banner<'a> {
    pub fn new(config: &'a Config, address: SocketAddr, document_root: &'a Path) -> Self {
        Self {
            config,
            address,
            document_root,
            network_ip: None,
            scripts: Vec::new(),
        }
    }

    pub fn with_network_ip(mut self, ip: Option<IpAddr>) -> Self {
        self.network_ip = ip;
        self
    }

    pub fn with_scripts(mut self, scripts: Vec<String>) -> Self {
        self.scripts = scripts;
        self
    }

    fn url(&self, host: &str) -> String {
        let script = self
            .config
            .tracking_script
            .as_deref()
            .map(|script| script.trim_start_matches('/'))
            .unwrap_or_default();
        format!("https://{host}:{}/{script}", self.address.port())
    }

    pub fn render(&self) -> String {
        let network = match self.network_ip {
            Some(IpAddr::V6(ip)) => self.url(&format!("[{ip}]")),
            Some(ip) => self.url(&ip.to_string()),
            None => "unable to determine".to_string(),
        };

        let mut lines = vec![
            String::new(),
            "    Tracking script server running".to_string(),
            String::new(),
            format!("    Server address:  https://{}", self.address),
            format!("    Serving from:    {}", self.document_root.display()),
            String::new(),
            "    Access URLs:".to_string(),
            format!("       Local:    {}", self.url("localhost")),
            format!("       Network:  {network}"),
            String::new(),
            "    Using a self-signed certificate, browsers will show a security warning".to_string(),
            "    Press Ctrl+C to stop the server".to_string(),
            String::new(),
        ];

        if self.scripts.is_empty() {
            lines.push("No .js files found in the document root!".to_string());
        } else {
            lines.push("Available JavaScript files:".to_string());
            lines.extend(self.scripts.iter().map(|script| format!("   - {script}")));
        }

        lines.push(String::new());
        lines.push("=".repeat(RULE_WIDTH));
        lines.join("\n")
    }

    pub fn print(&self) {
        println!("{}\n", self.render());
    }
}
