/// Line-dispatch parser for the OBJ-style mesh text format
///
/// Handles vertex (`v`), texture coordinate (`vt`) and triangle face (`f`)
/// lines. Comments (`#`) and group declarations (`g`) are skipped, anything
/// else aborts the parse.
use log::debug;
use nom::{
    character::complete::{char, i64 as integer},
    combinator::{all_consuming, opt, rest},
    number::complete::float,
    sequence::{preceded, terminated},
};

use crate::error::{LineKind, ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Spanned, Token};

/// Flat numeric arrays produced by [`parse_obj`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjData {
    /// 4 entries (x, y, z, w) per vertex
    pub positions: Vec<f32>,
    /// 3 zero-based vertex indices per triangle
    pub indices: Vec<u32>,
    /// 2 entries (u, v) per texture coordinate, empty unless `has_texture`
    pub tex_coords: Vec<f32>,
    pub has_texture: bool,
}

impl ObjData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 4
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Write the data back out in the source grammar.
    pub fn to_obj_string(&self) -> String {
        let mut out = String::new();
        for p in self.positions.chunks_exact(4) {
            out.push_str(&format!("v {} {} {} {}\n", p[0], p[1], p[2], p[3]));
        }
        for t in self.tex_coords.chunks_exact(2) {
            out.push_str(&format!("vt {} {}\n", t[0], t[1]));
        }
        for f in self.indices.chunks_exact(3) {
            out.push_str(&format!("f {} {} {}\n", f[0] + 1, f[1] + 1, f[2] + 1));
        }
        out
    }
}

struct Line<'a> {
    keyword: &'a str,
    number: usize,
    fields: Vec<&'a str>,
}

struct ObjParser<'n> {
    name: &'n str,
    data: ObjData,
    /// Largest one-based face reference seen so far and the line it came from
    max_reference: Option<(i64, usize)>,
}

impl<'n> ObjParser<'n> {
    fn error(&self, line: usize, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.name, line, kind)
    }

    fn expect_fields(
        &self,
        line: &Line<'_>,
        kind: LineKind,
        min: usize,
        max: usize,
    ) -> Result<(), ParseError> {
        let found = line.fields.len();
        if found < min {
            return Err(self.error(
                line.number,
                ParseErrorKind::TooFewFields {
                    kind,
                    expected: min,
                    found,
                },
            ));
        }
        if found > max {
            return Err(self.error(line.number, ParseErrorKind::TooManyFields { kind, max, found }));
        }
        Ok(())
    }

    fn float_field(&self, line: usize, field: &str) -> Result<f32, ParseError> {
        all_consuming(float::<_, nom::error::Error<&str>>)(field)
            .map(|(_, value)| value)
            .map_err(|_| self.error(line, ParseErrorKind::InvalidNumber(field.to_string())))
    }

    /// Vertex part of a face reference; `7`, `7/2` and `7/2/5` all give 7.
    fn index_field(&self, line: usize, field: &str) -> Result<i64, ParseError> {
        all_consuming(terminated(
            integer::<_, nom::error::Error<&str>>,
            opt(preceded(char('/'), rest)),
        ))(field)
        .map(|(_, value)| value)
        .map_err(|_| self.error(line, ParseErrorKind::InvalidNumber(field.to_string())))
    }

    fn finish_line(&mut self, line: Line<'_>) -> Result<(), ParseError> {
        match line.keyword {
            "v" => {
                self.expect_fields(&line, LineKind::Vertex, 3, 4)?;
                for field in &line.fields {
                    let value = self.float_field(line.number, field)?;
                    self.data.positions.push(value);
                }
                if line.fields.len() == 3 {
                    self.data.positions.push(1.0);
                }
            }
            "vt" => {
                // a third (w) component is accepted and dropped
                self.expect_fields(&line, LineKind::TextureCoord, 2, 3)?;
                for field in &line.fields[..2] {
                    let value = self.float_field(line.number, field)?;
                    self.data.tex_coords.push(value);
                }
                self.data.has_texture = true;
            }
            "f" => {
                if line.fields.len() > 3 {
                    return Err(self.error(
                        line.number,
                        ParseErrorKind::UnsupportedPolygon(line.fields.len()),
                    ));
                }
                self.expect_fields(&line, LineKind::Face, 3, 3)?;
                for field in &line.fields {
                    let index = self.index_field(line.number, field)?;
                    let zero_based = index
                        .checked_sub(1)
                        .and_then(|i| u32::try_from(i).ok())
                        .ok_or_else(|| {
                            self.error(
                                line.number,
                                ParseErrorKind::IndexOutOfRange {
                                    index,
                                    vertex_count: self.data.vertex_count(),
                                },
                            )
                        })?;
                    self.data.indices.push(zero_based);
                    if self.max_reference.map_or(true, |(max, _)| index > max) {
                        self.max_reference = Some((index, line.number));
                    }
                }
            }
            "g" => {}
            other => {
                return Err(self.error(
                    line.number,
                    ParseErrorKind::UnrecognizedLine(other.to_string()),
                ))
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<ObjData, ParseError> {
        let vertex_count = self.data.vertex_count();
        if let Some((index, line)) = self.max_reference {
            if index as usize > vertex_count {
                return Err(self.error(
                    line,
                    ParseErrorKind::IndexOutOfRange {
                        index,
                        vertex_count,
                    },
                ));
            }
        }
        debug!(
            "parsed {}: {} vertices, {} triangles, texture coordinates: {}",
            self.name,
            vertex_count,
            self.data.triangle_count(),
            self.data.has_texture
        );
        Ok(self.data)
    }
}

/// Parse mesh source text. `name` only labels error messages.
pub fn parse_obj(name: &str, text: &str) -> Result<ObjData, ParseError> {
    let mut parser = ObjParser {
        name,
        data: ObjData::default(),
        max_reference: None,
    };
    let mut current: Option<Line<'_>> = None;

    for Spanned { token, line } in Lexer::new(text) {
        match token {
            Token::Keyword(keyword) => {
                current = Some(Line {
                    keyword,
                    number: line,
                    fields: Vec::new(),
                });
            }
            Token::Number(field) => {
                if let Some(current) = current.as_mut() {
                    current.fields.push(field);
                }
            }
            Token::Comment(_) => {}
            Token::Newline => {
                if let Some(finished) = current.take() {
                    parser.finish_line(finished)?;
                }
            }
        }
    }
    // last line may lack a trailing newline
    if let Some(finished) = current.take() {
        parser.finish_line(finished)?;
    }

    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "\
# one triangle
g tri
v 0.0 0.0 0.0
v 1.0 0.0 0.0 1.0
v 0.0  1.0   0.0
f 1 2 3
";

    fn parse_err(text: &str) -> ParseError {
        parse_obj("test.obj", text).expect_err("expected a parse error")
    }

    #[test]
    fn test_parse_triangle() {
        let data = parse_obj("tri.obj", TRIANGLE).unwrap();
        assert_eq!(
            data.positions,
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]
        );
        assert_eq!(data.indices, vec![0, 1, 2]);
        assert!(!data.has_texture);
        assert!(data.tex_coords.is_empty());
    }

    #[test]
    fn test_counts_match_lines() {
        let mut text = String::new();
        let n: usize = 12;
        for i in 0..n {
            text.push_str(&format!("v {} {} {}\n", i, i * 2, -(i as i64)));
        }
        for i in 0..n - 2 {
            text.push_str(&format!("f {} {} {}\n", i + 1, i + 2, i + 3));
        }
        let data = parse_obj("strip.obj", &text).unwrap();
        assert_eq!(data.positions.len(), 4 * n);
        assert_eq!(data.indices.len(), 3 * (n - 2));
        assert!(data.indices.iter().all(|&i| (i as usize) < n));
    }

    #[test]
    fn test_texture_coordinates() {
        let data = parse_obj("quad.obj", "v 0 0 0\nvt 0.25 0.75\nvt 1 0 0\nf 1 1 1\n").unwrap();
        assert!(data.has_texture);
        assert_eq!(data.tex_coords, vec![0.25, 0.75, 1.0, 0.0]);
    }

    #[test]
    fn test_face_references_with_slashes() {
        let data =
            parse_obj("slash.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1 2/2/2 3//3\n").unwrap();
        assert_eq!(data.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_last_line_without_newline() {
        let data = parse_obj("eof.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3").unwrap();
        assert_eq!(data.indices.len(), 3);
    }

    #[test]
    fn test_round_trip() {
        let source = "v 0.5 -1.25 3 1\nv 2 0.125 -7.5 0.5\nv 1e-3 4 4\nvt 0.1 0.9\nf 3 1 2\nf 1 2 3\n";
        let first = parse_obj("a.obj", source).unwrap();
        let second = parse_obj("b.obj", &first.to_obj_string()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_vertex_with_two_fields_fails() {
        let err = parse_err("v 1.0 2.0\n");
        assert_eq!(err.line, 1);
        assert_eq!(
            err.kind,
            ParseErrorKind::TooFewFields {
                kind: LineKind::Vertex,
                expected: 3,
                found: 2
            }
        );
        assert!(err.to_string().contains("test.obj, line 1"));
    }

    #[test]
    fn test_short_lines_fail() {
        let err = parse_err("v 0 0 0\nvt 0.5\n");
        assert_eq!(err.line, 2);
        assert!(matches!(
            err.kind,
            ParseErrorKind::TooFewFields {
                kind: LineKind::TextureCoord,
                ..
            }
        ));

        let err = parse_err("v 0 0 0\n\nf 1 1\n");
        assert_eq!(err.line, 3);
        assert!(matches!(
            err.kind,
            ParseErrorKind::TooFewFields {
                kind: LineKind::Face,
                ..
            }
        ));
    }

    #[test]
    fn test_unrecognized_line_fails() {
        let err = parse_err("v 0 0 0\nusemtl shiny\n");
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ParseErrorKind::UnrecognizedLine("usemtl".into()));
    }

    #[test]
    fn test_invalid_number_fails() {
        let err = parse_err("v 0 zero 0\n");
        assert_eq!(err.kind, ParseErrorKind::InvalidNumber("zero".into()));
    }

    #[test]
    fn test_bad_indices_fail() {
        let err = parse_err("v 0 0 0\nf 0 1 1\n");
        assert!(matches!(err.kind, ParseErrorKind::IndexOutOfRange { index: 0, .. }));

        let err = parse_err("v 0 0 0\nv 1 0 0\nf 1 2 3\nv 0 1 0\nf 1 2 5\n");
        assert_eq!(err.line, 5);
        assert_eq!(
            err.kind,
            ParseErrorKind::IndexOutOfRange {
                index: 5,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn test_extreme_negative_index_fails() {
        let err = parse_err("v 0 0 0\nf -9223372036854775808 1 1\n");
        assert_eq!(err.line, 2);
        assert_eq!(
            err.kind,
            ParseErrorKind::IndexOutOfRange {
                index: i64::MIN,
                vertex_count: 1
            }
        );
    }

    #[test]
    fn test_quads_are_rejected() {
        let err = parse_err("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n");
        assert_eq!(err.kind, ParseErrorKind::UnsupportedPolygon(4));
    }
}
