//! Line-oriented parser for expectation scripts.

use super::condition::parse_condition;
use super::{Chunk, ScriptError, ScriptErrorKind, Variables, is_expectation_title};

const HEADER_PREFIX: &str = "//@";
const EXPECTATION_PREFIX: &str = "||";
const PLACEHOLDER_OPEN: &str = "<<<";
const PLACEHOLDER_CLOSE: &str = ">>>";

struct Ctx<'a> {
    name: &'a str,
    source: &'a str,
    vars: &'a Variables,
}

impl Ctx<'_> {
    fn error(&self, kind: ScriptErrorKind, line: usize, offset: usize, len: usize) -> ScriptError {
        ScriptError::new(kind, self.name, self.source, line, offset, len)
    }
}

pub(super) fn parse_chunks(name: &str, source: &str, vars: &Variables) -> Result<Vec<Chunk>, ScriptError> {
    let ctx = Ctx { name, source, vars };
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut offset = 0;

    for (index, raw) in source.split_inclusive('\n').enumerate() {
        let line_no = index + 1;
        let line_start = offset;
        offset += raw.len();
        let line = raw.trim_end_matches(['\n', '\r']);

        if let Some(rest) = line.strip_prefix(HEADER_PREFIX) {
            let header_start = line_start + HEADER_PREFIX.len() + (rest.len() - rest.trim_start().len());
            let chunk = parse_header(&ctx, rest.trim(), header_start, line_no, line_start, line.len())?;
            // Same title is fine under different guards; the active one is picked at expectation time.
            if chunks
                .iter()
                .any(|c| c.title == chunk.title && c.condition == chunk.condition)
            {
                return Err(ctx.error(
                    ScriptErrorKind::DuplicateTitle(chunk.title.clone()),
                    line_no,
                    header_start,
                    chunk.title.len(),
                ));
            }
            chunks.push(chunk);
        } else if let Some(text) = line.strip_prefix(EXPECTATION_PREFIX) {
            let text_start = line_start + EXPECTATION_PREFIX.len();
            let Some(chunk) = chunks.last_mut() else {
                return Err(ctx.error(
                    ScriptErrorKind::ExpectationOutsideChunk,
                    line_no,
                    line_start,
                    line.len(),
                ));
            };
            let text = substitute(&ctx, text, text_start, line_no)?;
            check_single_expectation(&ctx, chunk, &text, line_no, line_start, line.len())?;
            chunk.errors.push(text);
        } else if !line.trim().is_empty() {
            // Text before the first header is a preamble and carries no expectation.
            if let Some(chunk) = chunks.last_mut() {
                let text = substitute(&ctx, line, line_start, line_no)?;
                check_single_expectation(&ctx, chunk, &text, line_no, line_start, line.len())?;
                chunk.output.push(text);
            }
        }
    }

    Ok(chunks)
}

/// A chunk feeding a variant's expectation is checked as one substring, so it may hold one non-empty line.
fn check_single_expectation(
    ctx: &Ctx<'_>,
    chunk: &Chunk,
    text: &str,
    line_no: usize,
    line_start: usize,
    line_len: usize,
) -> Result<(), ScriptError> {
    if text.is_empty() || !is_expectation_title(&chunk.title) || chunk.expected().is_empty() {
        return Ok(());
    }
    Err(ctx.error(
        ScriptErrorKind::ExtraExpectation(chunk.title.clone()),
        line_no,
        line_start,
        line_len,
    ))
}

fn parse_header(
    ctx: &Ctx<'_>,
    header: &str,
    header_start: usize,
    line_no: usize,
    line_start: usize,
    line_len: usize,
) -> Result<Chunk, ScriptError> {
    let (title, condition) = match header.rfind('{') {
        Some(open) if header.ends_with('}') => {
            let text = &header[open + 1..header.len() - 1];
            let condition = parse_condition(text).map_err(|e| {
                ctx.error(
                    ScriptErrorKind::InvalidCondition(e.message),
                    line_no,
                    header_start + open + 1 + e.offset,
                    e.len,
                )
            })?;
            (header[..open].trim_end(), Some(condition))
        }
        // A brace inside a plain title is text, unless the title would otherwise name an expectation.
        Some(open) if is_expectation_title(header[..open].trim_end()) => {
            return Err(ctx.error(
                ScriptErrorKind::UnterminatedCondition,
                line_no,
                header_start + open,
                header.len() - open,
            ));
        }
        _ => (header, None),
    };

    if title.is_empty() {
        return Err(ctx.error(ScriptErrorKind::MissingTitle, line_no, line_start, line_len));
    }

    Ok(Chunk {
        title: title.to_string(),
        condition,
        errors: Vec::new(),
        output: Vec::new(),
        line: line_no,
        title_span: (header_start, title.len()).into(),
    })
}

/// Replace every `<<<name>>>` in `text`. `base` is the source offset of `text`, for error spans.
fn substitute(ctx: &Ctx<'_>, text: &str, base: usize, line_no: usize) -> Result<String, ScriptError> {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    let mut consumed = 0;

    while let Some(open) = rest.find(PLACEHOLDER_OPEN) {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + PLACEHOLDER_OPEN.len()..];
        let Some(close) = after_open.find(PLACEHOLDER_CLOSE) else {
            return Err(ctx.error(
                ScriptErrorKind::UnterminatedPlaceholder,
                line_no,
                base + consumed + open,
                rest.len() - open,
            ));
        };

        let var_name = &after_open[..close];
        let Some(value) = ctx.vars.get(var_name) else {
            return Err(ctx.error(
                ScriptErrorKind::UnknownVariable(var_name.to_string()),
                line_no,
                base + consumed + open,
                PLACEHOLDER_OPEN.len() + close + PLACEHOLDER_CLOSE.len(),
            ));
        };
        result.push_str(value);

        let advance = open + PLACEHOLDER_OPEN.len() + close + PLACEHOLDER_CLOSE.len();
        consumed += advance;
        rest = &rest[advance..];
    }
    result.push_str(rest);

    Ok(result)
}
