//! Error type for the header generator.

use std::path::PathBuf;

use prism_interface::InterfaceError;
use thiserror::Error;

/// Header generator error type
#[derive(Error, Debug)]
pub enum HeadersError {
    #[error(transparent)]
    Interface(#[from] InterfaceError),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} header(s) out of date: {}", .0.len(), display_paths(.0))]
    Mismatch(Vec<PathBuf>),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HeadersError::Mismatch(vec![
            PathBuf::from("assets/v450/defines.h"),
            PathBuf::from("assets/v450/gltf/defines.h"),
        ]);
        assert_eq!(
            err.to_string(),
            "2 header(s) out of date: assets/v450/defines.h, assets/v450/gltf/defines.h"
        );

        let err: HeadersError = InterfaceError::UnknownSymbol("LIGHT_LOCATION".into()).into();
        assert!(err.to_string().contains("LIGHT_LOCATION"));
    }

    #[test]
    fn test_io_error_names_path() {
        let err = HeadersError::Io {
            path: PathBuf::from("assets/v450/defines.h"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "assets/v450/defines.h: missing");
    }
}
