//! Path templates with `:name` placeholders, e.g. `todos/:id`.

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed path template. Parameters are positional: the wire path must
/// have exactly as many segments as the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Self {
        let trimmed = template.trim_start_matches('/');
        let segments = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed
                .split('/')
                .map(|segment| match segment.strip_prefix(':') {
                    Some(name) => Segment::Param(name.to_string()),
                    None => Segment::Literal(segment.to_string()),
                })
                .collect()
        };
        Self {
            raw: trimmed.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Position of `:name` in the template, counting literal segments too.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.segments
            .iter()
            .position(|segment| matches!(segment, Segment::Param(p) if p == name))
    }

    /// Substitute every placeholder with its value, in template order.
    pub fn expand(&self, params: &[(&str, String)]) -> Result<Vec<String>, ApiError> {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(literal) => Ok(literal.clone()),
                Segment::Param(name) => params
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| value.clone())
                    .ok_or_else(|| ApiError::MissingPathParam {
                        template: self.raw.clone(),
                        name: name.clone(),
                    }),
            })
            .collect()
    }

    pub fn matches(&self, path: &[String]) -> bool {
        path.len() == self.segments.len()
            && self.segments.iter().zip(path).all(|(segment, actual)| match segment {
                Segment::Literal(literal) => literal == actual,
                Segment::Param(_) => true,
            })
    }

    pub fn ensure_matches(&self, path: &[String]) -> Result<(), ApiError> {
        if self.matches(path) {
            Ok(())
        } else {
            Err(ApiError::PathMismatch {
                template: self.raw.clone(),
                path: path.to_vec(),
            })
        }
    }

    /// Value of `:name` in a wire path matching this template.
    pub fn extract<'a>(&self, path: &'a [String], name: &str) -> Result<&'a str, ApiError> {
        self.ensure_matches(path)?;
        let position = self.position(name).ok_or_else(|| ApiError::MissingPathParam {
            template: self.raw.clone(),
            name: name.to_string(),
        })?;
        Ok(path[position].as_str())
    }

    /// The template in axum route syntax: `/todos/{id}`.
    pub fn route(&self) -> String {
        let segments: Vec<String> = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(literal) => literal.clone(),
                Segment::Param(name) => format!("{{{name}}}"),
            })
            .collect();
        format!("/{}", segments.join("/"))
    }

    /// The route with every parameter renamed by position, e.g. `/todos/{p1}`.
    /// Templates that differ only in parameter names share one shape.
    pub fn shape(&self) -> String {
        let segments: Vec<String> = self
            .segments
            .iter()
            .enumerate()
            .map(|(position, segment)| match segment {
                Segment::Literal(literal) => literal.clone(),
                Segment::Param(_) => format!("{{p{position}}}"),
            })
            .collect();
        format!("/{}", segments.join("/"))
    }

    /// One flag per segment, `true` for literals. Comparing masks orders
    /// templates the way a router does: a literal wins over a parameter at
    /// the first position where they differ.
    pub fn literal_mask(&self) -> Vec<bool> {
        self.segments
            .iter()
            .map(|segment| matches!(segment, Segment::Literal(_)))
            .collect()
    }
}
