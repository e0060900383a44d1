//! EPUB archive extraction.
//!
//! Opens the ZIP container, finds the package document, records the fragment
//! reading order and copies every markup fragment into a per-book directory
//! under its bare file name. Nothing about the package is validated beyond
//! what is needed to find fragment hrefs.

use crate::config::{AppConfig, OrderSource};
use crate::order::{fragment_basename, resolve_order, write_order_list};
use crate::util::{ensure_dir, has_extension};
use anyhow::{Context, Result, anyhow};
use epub::archive::EpubArchive;
use percent_encoding::percent_decode_str;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONTAINER_PATH: &str = "META-INF/container.xml";
const FRAGMENT_EXTENSIONS: &[&str] = &["xhtml", "html", "htm"];

/// Manifest hrefs and spine order from an OPF package document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    /// `(id, href)` in declaration order.
    pub manifest: Vec<(String, String)>,
    pub spine: Vec<String>,
}

impl Package {
    /// Fragment hrefs in manifest declaration order.
    pub fn manifest_fragments(&self) -> Vec<String> {
        self.manifest
            .iter()
            .map(|(_, href)| href.clone())
            .filter(|href| is_fragment_href(href))
            .collect()
    }

    /// Fragment hrefs in spine order; idrefs without a manifest entry are dropped.
    pub fn spine_fragments(&self) -> Vec<String> {
        self.spine
            .iter()
            .filter_map(|idref| {
                self.manifest
                    .iter()
                    .find(|(id, _)| id == idref)
                    .map(|(_, href)| href.clone())
            })
            .filter(|href| is_fragment_href(href))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ExtractedBook {
    pub dir: PathBuf,
    pub order: Vec<String>,
    pub fragments: usize,
}

pub struct Extractor {
    output_root: PathBuf,
    order_file_name: String,
    order_source: OrderSource,
}

impl Extractor {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            output_root: PathBuf::from(&cfg.output_root),
            order_file_name: cfg.order_file_name.clone(),
            order_source: cfg.order_source,
        }
    }

    /// Directory that receives the fragments of `archive_path`.
    pub fn book_dir(&self, archive_path: &Path) -> PathBuf {
        let stem = archive_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "book".to_string());
        self.output_root.join(stem)
    }

    pub fn extract(&self, archive_path: &Path) -> Result<ExtractedBook> {
        info!(path = %archive_path.display(), "Opening EPUB archive");
        let mut archive = EpubArchive::new(archive_path).map_err(|err| {
            anyhow!(
                "Failed to open EPUB archive {}: {err}",
                archive_path.display()
            )
        })?;

        let opf_path = locate_package(&mut archive)?;
        let opf = read_entry(&mut archive, &opf_path)?;
        let package = parse_package(&String::from_utf8_lossy(strip_bom(&opf)))
            .with_context(|| format!("Failed to parse package document {opf_path}"))?;
        let hrefs = match self.order_source {
            OrderSource::Manifest => package.manifest_fragments(),
            OrderSource::Spine => package.spine_fragments(),
        };
        debug!(
            opf = %opf_path,
            source = %self.order_source,
            hrefs = hrefs.len(),
            "Resolved fragment hrefs"
        );

        let dir = self.book_dir(archive_path);
        ensure_dir(&dir)?;
        let order = resolve_order(hrefs.iter().map(|href| decode_href(href)));
        write_order_list(&dir.join(&self.order_file_name), &order)?;

        let entries: Vec<String> = archive
            .files
            .iter()
            .filter(|name| {
                !name.ends_with('/') && has_extension(Path::new(name), FRAGMENT_EXTENSIONS)
            })
            .cloned()
            .collect();
        for name in &entries {
            let bytes = read_entry(&mut archive, name)?;
            let target = dir.join(fragment_basename(name));
            fs::write(&target, bytes)
                .with_context(|| format!("Failed to write fragment {}", target.display()))?;
            debug!(path = %target.display(), "Extracted file");
        }

        info!(
            path = %archive_path.display(),
            dir = %dir.display(),
            fragments = entries.len(),
            ordered = order.len(),
            "Finished extracting EPUB"
        );
        Ok(ExtractedBook {
            dir,
            order,
            fragments: entries.len(),
        })
    }
}

/// Manifest hrefs that name a markup fragment.
pub fn is_fragment_href(href: &str) -> bool {
    href.contains("html") || href.ends_with(".htm")
}

fn decode_href(href: &str) -> String {
    percent_decode_str(href).decode_utf8_lossy().to_string()
}

fn read_entry<R>(archive: &mut EpubArchive<R>, name: &str) -> Result<Vec<u8>>
where
    R: std::io::Read + std::io::Seek,
{
    archive
        .get_entry(name)
        .map_err(|err| anyhow!("Failed to read archive entry {name}: {err}"))
}

/// Package document path from `container.xml`, else the first `.opf` entry.
fn locate_package<R>(archive: &mut EpubArchive<R>) -> Result<String>
where
    R: std::io::Read + std::io::Seek,
{
    match archive.get_entry(CONTAINER_PATH) {
        Ok(bytes) => match parse_container(strip_bom(&bytes)) {
            Ok(Some(path)) => return Ok(path),
            Ok(None) => warn!("container.xml names no rootfile; scanning for .opf"),
            Err(err) => warn!("Unreadable container.xml, scanning for .opf: {err:#}"),
        },
        Err(err) => debug!("No container.xml ({err}); scanning for .opf"),
    }

    archive
        .files
        .iter()
        .find(|name| has_extension(Path::new(name), &["opf"]))
        .cloned()
        .ok_or_else(|| anyhow!("No package document (.opf) found in archive"))
}

/// `rootfile/@full-path` from `META-INF/container.xml`.
pub fn parse_container(bytes: &[u8]) -> Result<Option<String>> {
    let content = String::from_utf8_lossy(bytes);
    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if local_name(e.name().as_ref()) == b"rootfile" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        let path = attr
                            .decode_and_unescape_value(reader.decoder())
                            .map_err(|err| anyhow!("Bad rootfile path in container.xml: {err}"))?;
                        return Ok(Some(path.into_owned()));
                    }
                }
            }
            Ok(Event::Eof) => return Ok(None),
            Err(err) => return Err(anyhow!("Malformed container.xml: {err}")),
            _ => {}
        }
    }
}

/// Collect manifest items (declaration order) and spine idrefs from an OPF document.
pub fn parse_package(content: &str) -> Result<Package> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);
    let mut package = Package::default();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"item" => {
                    let mut id = String::new();
                    let mut href = String::new();
                    for attr in e.attributes().flatten() {
                        let Ok(value) = attr.decode_and_unescape_value(reader.decoder()) else {
                            continue;
                        };
                        match attr.key.as_ref() {
                            b"id" => id = value.into_owned(),
                            b"href" => href = value.into_owned(),
                            _ => {}
                        }
                    }
                    if !href.is_empty() {
                        package.manifest.push((id, href));
                    }
                }
                b"itemref" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() != b"idref" {
                            continue;
                        }
                        if let Ok(value) = attr.decode_and_unescape_value(reader.decoder()) {
                            package.spine.push(value.into_owned());
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(anyhow!("Malformed package document: {err}")),
            _ => {}
        }
    }

    Ok(package)
}

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data)
}

/// Extract local name from potentially namespaced XML name
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}
