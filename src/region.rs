use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A region of bytes that can be loaded into memory
pub trait Region {
  fn bytes(&self) -> &[u8];
}

/// An error that occurred while reading a program image
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
  #[error("could not read program image `{}`", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// A program image, loaded into memory starting at address zero.
///
/// On disk an image is text, one byte per line written in binary. Anything
/// after a `#` is a comment, and lines that are not an 8-bit binary number
/// (blank lines, comment-only lines, stray text) are skipped:
///
/// ```text
/// 10000010 # LDI R0,8
/// 00000000
/// 00001000
/// 01000111 # PRN R0
/// 00000000
/// 00000001 # HLT
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
  bytes: Vec<u8>,
}

impl Image {
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
      path: path.to_owned(),
      source,
    })?;
    let image = Self::parse(&text);
    log::debug!("loaded {} bytes from {}", image.len(), path.display());
    Ok(image)
  }

  pub fn parse(text: &str) -> Self {
    let bytes = text
      .lines()
      .enumerate()
      .filter_map(|(number, line)| {
        let code = line.split('#').next().unwrap_or_default().trim();
        match u8::from_str_radix(code, 2) {
          Ok(byte) => Some(byte),
          Err(_) => {
            if !code.is_empty() {
              log::debug!("skipping line {}: {:?}", number + 1, code);
            }
            None
          }
        }
      })
      .collect();
    Self { bytes }
  }

  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }
}

impl FromStr for Image {
  type Err = std::convert::Infallible;

  fn from_str(text: &str) -> Result<Self, Self::Err> {
    Ok(Self::parse(text))
  }
}

impl From<Vec<u8>> for Image {
  fn from(bytes: Vec<u8>) -> Self {
    Self { bytes }
  }
}

impl Region for Image {
  fn bytes(&self) -> &[u8] {
    &self.bytes
  }
}

impl Region for [u8] {
  fn bytes(&self) -> &[u8] {
    self
  }
}

impl Region for Vec<u8> {
  fn bytes(&self) -> &[u8] {
    self
  }
}
