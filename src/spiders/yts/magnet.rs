//! Mapping of YTS payloads onto local torrent fields.

use super::api::{MovieData, TorrentData};
use crate::models::Torrent;

/// Announce endpoints appended to every magnet URI, in this order.
pub const TRACKERS: [&str; 16] = [
    "udp://tracker.opentrackr.org:1337",
    "udp://tracker.tiny-vps.com:6969",
    "udp://tracker.openbittorrent.com:1337",
    "udp://tracker.coppersurfer.tk:6969",
    "udp://tracker.leechers-paradise.org:6969",
    "udp://p4p.arenabg.ch:1337",
    "udp://p4p.arenabg.com:1337",
    "udp://tracker.internetwarriors.net:1337",
    "udp://9.rarbg.to:2710",
    "udp://9.rarbg.me:2710",
    "udp://exodus.desync.com:6969",
    "udp://tracker.cyberia.is:6969",
    "udp://tracker.torrent.eu.org:451",
    "udp://open.stealth.si:80",
    "udp://tracker.moeking.me:6969",
    "udp://tracker.zerobytes.xyz:1337",
];

/// Magnet URI for an info hash with the fixed tracker list.
pub fn magnet_url(hash: &str) -> String {
    let trackers = TRACKERS
        .iter()
        .map(|tracker| format!("tr={}", tracker))
        .collect::<Vec<_>>()
        .join("&");
    format!("magnet:?xt=urn:btih:{}&{}", hash, trackers)
}

/// Composite key of a torrent: `<movie id>:<info hash>`.
pub fn topic_id(movie: &MovieData, torrent: &TorrentData) -> String {
    format!("{}:{}", movie.id, torrent.hash)
}

/// Normalized descriptive fields for one torrent of a movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentFields {
    pub provider_title: String,
    pub url: String,
    pub seed: i32,
    pub peer: i32,
    pub quality: String,
    pub language: String,
    pub size: i64,
}

impl TorrentFields {
    pub fn build(movie: &MovieData, torrent: &TorrentData) -> Self {
        Self {
            provider_title: movie.title.clone(),
            url: magnet_url(&torrent.hash),
            seed: torrent.seeds,
            peer: torrent.peers,
            quality: torrent.quality.clone(),
            language: movie.language.clone(),
            size: torrent.size_bytes,
        }
    }

    /// Overwrite the descriptive fields of a stored torrent.
    pub fn apply_to(self, torrent: &mut Torrent) {
        torrent.provider_title = self.provider_title;
        torrent.url = self.url;
        torrent.seed = self.seed;
        torrent.peer = self.peer;
        torrent.quality = self.quality;
        torrent.language = self.language;
        torrent.size = self.size;
    }
}
