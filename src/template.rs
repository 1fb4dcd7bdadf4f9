// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Compiled record templates.
//!
//! A template is a format string with `${tag}` placeholders:
//!
//! ```text
//! ${prefix}${time_local} ${level}:${pid}:${mid_file}:${line}: ${message}\n
//! ```
//!
//! Compilation never fails. An opening `${` without a closing `}` is kept as literal text.

const START_TAG: &str = "${";
const END_TAG: &str = "}";

/// The template used when none is configured.
pub const DEFAULT_FORMAT: &str =
    "${prefix}${time_local} ${level}:${pid}:${mid_file}:${line}: ${message}\n";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Tag(String),
}

/// A format string split into literal text and named tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Default for Template {
    fn default() -> Self {
        Template::compile(DEFAULT_FORMAT)
    }
}

impl Template {
    /// Compile `format` into a template.
    pub fn compile(format: &str) -> Template {
        let mut segments = vec![];
        let mut literal = String::new();
        let mut rest = format;

        while let Some(start) = rest.find(START_TAG) {
            let after = &rest[start + START_TAG.len()..];
            let Some(end) = after.find(END_TAG) else {
                break;
            };

            literal.push_str(&rest[..start]);
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Tag(after[..end].to_string()));
            rest = &after[end + END_TAG.len()..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Template { segments }
    }

    /// Names of the tags in order of appearance.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Tag(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Append the rendered template to `buf`, calling `resolve` for every tag.
    pub fn execute<F>(&self, buf: &mut Vec<u8>, mut resolve: F)
    where
        F: FnMut(&str, &mut Vec<u8>),
    {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => buf.extend_from_slice(text.as_bytes()),
                Segment::Tag(name) => resolve(name, buf),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(template: &Template) -> String {
        let mut buf = vec![];
        template.execute(&mut buf, |tag, buf| match tag {
            "level" => buf.extend_from_slice(b"ERROR"),
            other => buf.extend_from_slice(format!("<{other}>").as_bytes()),
        });
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_literal_only_template_is_unchanged() {
        let text = "no placeholders here: $ { } $}\n";
        let template = Template::compile(text);
        assert_eq!(template.tags().count(), 0);
        assert_eq!(render(&template), text);
    }

    #[test]
    fn test_single_tag() {
        let template = Template::compile("${level}");
        assert_eq!(template.tags().collect::<Vec<_>>(), vec!["level"]);
        assert_eq!(render(&template), "ERROR");
    }

    #[test]
    fn test_mixed_segments() {
        let template = Template::compile("[${level}] ${message}!");
        assert_eq!(render(&template), "[ERROR] <message>!");
    }

    #[test]
    fn test_unterminated_tag_stays_literal() {
        let template = Template::compile("${level}: ${message");
        assert_eq!(render(&template), "ERROR: ${message");
    }

    #[test]
    fn test_empty_tag_name() {
        let template = Template::compile("a${}b");
        assert_eq!(template.tags().collect::<Vec<_>>(), vec![""]);
        assert_eq!(render(&template), "a<>b");
    }

    #[test]
    fn test_default_format_tags() {
        let template = Template::default();
        assert_eq!(
            template.tags().collect::<Vec<_>>(),
            vec!["prefix", "time_local", "level", "pid", "mid_file", "line", "message"]
        );
    }
}
