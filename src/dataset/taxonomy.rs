// file: src/dataset/taxonomy.rs
// description: SKOS RDF/XML taxonomy loading and level granulation
// reference: https://www.w3.org/2004/02/skos/ and https://docs.rs/quick-xml

use crate::config::QueryLevel;
use crate::error::{OverlapError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Concept {
    pub id: String,
    pub label: String,
    pub broader: Vec<String>,
    pub narrower: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    concepts: Vec<Concept>,
    index: HashMap<String, usize>,
}

#[derive(Default)]
struct PendingConcept {
    id: String,
    labels: Vec<(Option<String>, String)>,
    broader: Vec<String>,
    narrower: Vec<String>,
}

impl PendingConcept {
    fn best_label(&self) -> Option<String> {
        let preferred = self
            .labels
            .iter()
            .find(|(lang, _)| lang.as_deref().is_none_or(|l| l.eq_ignore_ascii_case("en")))
            .or_else(|| self.labels.first());

        preferred
            .map(|(_, text)| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }
}

enum Field {
    PrefLabel(Option<String>),
    Other,
}

impl Taxonomy {
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading taxonomy from {}", path.display());
        let xml = fs::read_to_string(path).map_err(|source| OverlapError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_with_origin(&xml, path)
    }

    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_with_origin(xml, Path::new("<inline>"))
    }

    fn parse_with_origin(xml: &str, origin: &Path) -> Result<Self> {
        let taxonomy_error = |message: String| OverlapError::Taxonomy {
            path: PathBuf::from(origin),
            message,
        };

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut pending: Vec<PendingConcept> = Vec::new();
        let mut current: Option<PendingConcept> = None;
        let mut field: Option<Field> = None;
        let mut depth_in_concept = 0usize;

        loop {
            let event = reader.read_event().map_err(|e| {
                taxonomy_error(format!(
                    "XML error at byte {}: {}",
                    reader.buffer_position(),
                    e
                ))
            })?;

            match event {
                Event::Start(element) => {
                    if current.is_some() {
                        depth_in_concept += 1;
                        if let Some(concept) = current.as_mut() {
                            field = Some(Self::open_field(&element, concept)?);
                        }
                    } else if is_concept_element(&element) {
                        current = Some(PendingConcept {
                            id: attribute(&element, b"about")?.unwrap_or_default(),
                            ..PendingConcept::default()
                        });
                        depth_in_concept = 0;
                    }
                }
                Event::Empty(element) => {
                    if let Some(concept) = current.as_mut() {
                        Self::open_field(&element, concept)?;
                    } else if is_concept_element(&element) {
                        debug!("Skipping empty concept element");
                    }
                }
                Event::Text(text) => {
                    if let (Some(concept), Some(Field::PrefLabel(lang))) =
                        (current.as_mut(), field.as_ref())
                    {
                        let value = text
                            .unescape()
                            .map_err(|e| taxonomy_error(format!("bad label text: {}", e)))?;
                        concept.labels.push((lang.clone(), value.into_owned()));
                    }
                }
                Event::CData(data) => {
                    if let (Some(concept), Some(Field::PrefLabel(lang))) =
                        (current.as_mut(), field.as_ref())
                    {
                        let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                        concept.labels.push((lang.clone(), value));
                    }
                }
                Event::End(_) => {
                    if current.is_some() {
                        if depth_in_concept == 0 {
                            if let Some(done) = current.take() {
                                pending.push(done);
                            }
                        } else {
                            depth_in_concept -= 1;
                            field = None;
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let taxonomy = Self::from_pending(pending);
        info!("Parsed {} labeled concepts", taxonomy.len());
        Ok(taxonomy)
    }

    fn open_field(element: &BytesStart<'_>, concept: &mut PendingConcept) -> Result<Field> {
        match element.local_name().as_ref() {
            b"prefLabel" => Ok(Field::PrefLabel(attribute(element, b"lang")?)),
            b"broader" => {
                if let Some(target) = attribute(element, b"resource")? {
                    concept.broader.push(target);
                }
                Ok(Field::Other)
            }
            b"narrower" => {
                if let Some(target) = attribute(element, b"resource")? {
                    concept.narrower.push(target);
                }
                Ok(Field::Other)
            }
            _ => Ok(Field::Other),
        }
    }

    fn from_pending(pending: Vec<PendingConcept>) -> Self {
        let mut concepts: Vec<Concept> = Vec::new();
        let mut index = HashMap::new();

        for item in pending {
            let Some(label) = item.best_label() else {
                warn!("Skipping concept without prefLabel: {}", item.id);
                continue;
            };
            if item.id.is_empty() || index.contains_key(&item.id) {
                continue;
            }
            index.insert(item.id.clone(), concepts.len());
            concepts.push(Concept {
                id: item.id,
                label,
                broader: item.broader,
                narrower: item.narrower,
            });
        }

        // Keep links between known concepts only, then mirror them.
        let mut edges: HashSet<(usize, usize)> = HashSet::new();
        for (child, concept) in concepts.iter().enumerate() {
            for parent in concept.broader.iter().filter_map(|id| index.get(id)) {
                edges.insert((*parent, child));
            }
            for narrower in concept.narrower.iter().filter_map(|id| index.get(id)) {
                edges.insert((child, *narrower));
            }
        }

        for concept in &mut concepts {
            concept.broader.clear();
            concept.narrower.clear();
        }

        let mut sorted: Vec<(usize, usize)> = edges.into_iter().filter(|(p, c)| p != c).collect();
        sorted.sort_unstable();
        for (parent, child) in sorted {
            let child_id = concepts[child].id.clone();
            let parent_id = concepts[parent].id.clone();
            concepts[parent].narrower.push(child_id);
            concepts[child].broader.push(parent_id);
        }

        Self { concepts, index }
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn get(&self, id: &str) -> Option<&Concept> {
        self.index.get(id).map(|&i| &self.concepts[i])
    }

    /// Longest chain of broader links from each concept up to a root.
    pub fn depths(&self) -> Vec<usize> {
        let mut memo: Vec<Option<usize>> = vec![None; self.concepts.len()];
        let mut visiting = vec![false; self.concepts.len()];

        for i in 0..self.concepts.len() {
            self.depth_of(i, &mut memo, &mut visiting);
        }

        memo.into_iter().map(|d| d.unwrap_or(0)).collect()
    }

    fn depth_of(&self, i: usize, memo: &mut [Option<usize>], visiting: &mut [bool]) -> usize {
        if let Some(depth) = memo[i] {
            return depth;
        }
        if visiting[i] {
            // cycle
            return 0;
        }
        visiting[i] = true;

        let parents: Vec<usize> = self.concepts[i]
            .broader
            .iter()
            .filter_map(|id| self.index.get(id).copied())
            .collect();

        let depth = parents
            .into_iter()
            .map(|p| self.depth_of(p, memo, visiting) + 1)
            .max()
            .unwrap_or(0);

        visiting[i] = false;
        memo[i] = Some(depth);
        depth
    }

    /// Concept labels at the requested granularity, in document order.
    pub fn labels(&self, level: QueryLevel) -> Vec<String> {
        let depths = self.depths();
        let mut seen = HashSet::new();

        self.concepts
            .iter()
            .zip(depths)
            .filter(|(concept, depth)| {
                let has_narrower = !concept.narrower.is_empty();
                match level {
                    QueryLevel::Top => concept.broader.is_empty(),
                    QueryLevel::Second => *depth == 1 && has_narrower,
                    QueryLevel::Third => *depth == 2 && has_narrower,
                    QueryLevel::Fourth => *depth == 3 && has_narrower,
                    QueryLevel::Leaf => !has_narrower,
                    QueryLevel::All => true,
                }
            })
            .map(|(concept, _)| concept.label.clone())
            .filter(|label| seen.insert(label.clone()))
            .collect()
    }
}

fn is_concept_element(element: &BytesStart<'_>) -> bool {
    matches!(element.local_name().as_ref(), b"Concept" | b"Description")
}

fn attribute(element: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes().flatten() {
        if attr.key.local_name().as_ref() == local {
            let value = attr
                .unescape_value()
                .map_err(|e| OverlapError::Dataset(format!("bad attribute value: {}", e)))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
