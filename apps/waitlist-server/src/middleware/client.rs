//! Client address resolution.

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;

/// Address of the client that sent `req`.
///
/// The TCP peer by default. With `trust_proxy`, the first address of
/// `Forwarded` / `X-Forwarded-For` is used when present.
pub fn client_ip(req: &HttpRequest, trust_proxy: bool) -> Option<String> {
    if trust_proxy {
        let forwarded = req
            .connection_info()
            .realip_remote_addr()
            .map(strip_port);
        if forwarded.is_some() {
            return forwarded;
        }
    }

    req.peer_addr().map(|addr| addr.ip().to_string())
}

fn strip_port(addr: &str) -> String {
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        return socket.ip().to_string();
    }
    if let Ok(ip) = addr.trim_matches(['[', ']']).parse::<IpAddr>() {
        return ip.to_string();
    }
    addr.to_string()
}
