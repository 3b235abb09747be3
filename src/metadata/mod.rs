// Publication-year metadata from companion XML files.
//
// Every document `<stem>.<ext>` in the corpus has a metadata file
// `<stem>.xml` in the metadata directory. The year is the text of the first
// element named `year`, wherever it sits in the tree; schema depth varies
// between publishers, so no fixed path is assumed.

pub mod join;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use roxmltree::{Document, ParsingOptions};
use tracing::{debug, info};

use crate::error::PipelineError;

pub use join::{join_years, DatedGammaRow};

/// Metadata file for a document id: same stem, `.xml` extension.
pub fn companion_path(metadata_dir: &Path, document_id: &str) -> PathBuf {
    let stem = Path::new(document_id)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| document_id.to_string());
    metadata_dir.join(format!("{stem}.xml"))
}

/// Find the first `year` element and parse its text.
///
/// `Ok(None)` when there is no such element; `InvalidYear` when there is
/// one but its content is not an integer.
pub fn extract_year(document_id: &str, xml: &str) -> Result<Option<i32>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let tree = Document::parse_with_options(xml, options)
        .with_context(|| format!("Malformed metadata XML for {document_id}"))?;

    let Some(node) = tree
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "year")
    else {
        return Ok(None);
    };

    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let value = text.trim();

    match value.parse::<i32>() {
        Ok(year) => Ok(Some(year)),
        Err(_) => Err(PipelineError::InvalidYear {
            document: document_id.to_string(),
            value: value.to_string(),
        }
        .into()),
    }
}

/// Read the year of every document. Fails on the first document without a
/// metadata file or without a `year` element.
pub fn load_years(metadata_dir: &Path, document_ids: &[String]) -> Result<BTreeMap<String, i32>> {
    let mut years = BTreeMap::new();

    for id in document_ids {
        let path = companion_path(metadata_dir, id);
        if !path.is_file() {
            return Err(PipelineError::MetadataNotFound {
                document: id.clone(),
                reason: format!("no file at {}", path.display()),
            }
            .into());
        }

        let xml = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match extract_year(id, &xml)? {
            Some(year) => {
                debug!(document = %id, year, "Year extracted");
                years.insert(id.clone(), year);
            }
            None => {
                return Err(PipelineError::MetadataNotFound {
                    document: id.clone(),
                    reason: format!("no <year> element in {}", path.display()),
                }
                .into());
            }
        }
    }

    info!(documents = years.len(), "Publication years loaded");
    Ok(years)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = r#"<?xml version="1.0"?>
<!DOCTYPE article SYSTEM "journalpublishing.dtd">
<article>
  <front>
    <article-meta>
      <title-group><article-title>On Things</article-title></title-group>
      <pub-date><day>1</day><month>5</month><year> 1987 </year></pub-date>
    </article-meta>
  </front>
</article>"#;

    #[test]
    fn test_year_at_any_depth() {
        assert_eq!(extract_year("a", NESTED).unwrap(), Some(1987));
        assert_eq!(
            extract_year("b", "<doc><year>2001</year></doc>").unwrap(),
            Some(2001)
        );
    }

    #[test]
    fn test_missing_year_is_none() {
        assert_eq!(extract_year("a", "<doc><month>3</month></doc>").unwrap(), None);
    }

    #[test]
    fn test_non_numeric_year() {
        let err = extract_year("a", "<doc><year>n.d.</year></doc>").unwrap_err();
        assert_eq!(
            err.downcast_ref::<PipelineError>(),
            Some(&PipelineError::InvalidYear {
                document: "a".into(),
                value: "n.d.".into()
            })
        );
    }

    #[test]
    fn test_companion_path_swaps_extension() {
        let p = companion_path(Path::new("/meta"), "journal-article-10.2307_123.txt");
        assert_eq!(p, PathBuf::from("/meta/journal-article-10.2307_123.xml"));
    }

    #[test]
    fn test_load_years_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.xml"), "<r><year>1990</year></r>").unwrap();

        let ids = vec!["a.txt".to_string(), "b.txt".to_string()];
        let err = load_years(dir.path(), &ids).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::MetadataNotFound { document, .. }) => assert_eq!(document, "b.txt"),
            other => panic!("unexpected error: {other:?}"),
        }

        let years = load_years(dir.path(), &ids[..1]).unwrap();
        assert_eq!(years["a.txt"], 1990);
    }
}
