//! Encoding detection and transcoding for localization source files.
//!
//! Files arrive as UTF-8 (with or without BOM), UTF-16 or UTF-32. [`detect`] sniffs the
//! byte-order mark, or probes the content when there is none, and hands back a reader
//! producing UTF-8. [`open_writer`] goes the other way: it takes UTF-8 and writes the
//! target encoding, BOM first.

use std::{
    fmt::Display,
    fs::File,
    io::{self, Read, Seek, SeekFrom, Write},
    path::Path,
    str::FromStr,
};

use encoding_rs::{Decoder, DecoderResult};
use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
pub const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
pub const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];
pub const UTF32LE_BOM: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
pub const UTF32BE_BOM: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

/// Bytes inspected when a file has no BOM. If this much of the file is UTF-8, the
/// rest is assumed to be too.
pub const PROBE_LEN: usize = 4 * 32 * 1024;

const UTF8_MAX_WIDTH: usize = 4;
const BOM_MAX_LEN: usize = 4;
const DECODE_CHUNK: usize = 8 * 1024;

/// Encodings recognized at the byte-stream boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodingLabel {
    #[serde(rename = "UTF8")]
    Utf8,
    #[serde(rename = "UTF8BOM")]
    Utf8Bom,
    #[serde(rename = "UTF16LE")]
    Utf16Le,
    #[serde(rename = "UTF16BE")]
    Utf16Be,
    #[serde(rename = "UTF32LE")]
    Utf32Le,
    #[serde(rename = "UTF32BE")]
    Utf32Be,
}

impl EncodingLabel {
    pub const ALL: [EncodingLabel; 6] = [
        EncodingLabel::Utf8,
        EncodingLabel::Utf8Bom,
        EncodingLabel::Utf16Le,
        EncodingLabel::Utf16Be,
        EncodingLabel::Utf32Le,
        EncodingLabel::Utf32Be,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingLabel::Utf8 => "UTF8",
            EncodingLabel::Utf8Bom => "UTF8BOM",
            EncodingLabel::Utf16Le => "UTF16LE",
            EncodingLabel::Utf16Be => "UTF16BE",
            EncodingLabel::Utf32Le => "UTF32LE",
            EncodingLabel::Utf32Be => "UTF32BE",
        }
    }

    /// Byte-order mark written ahead of content in this encoding (empty for plain UTF-8).
    pub fn bom(&self) -> &'static [u8] {
        match self {
            EncodingLabel::Utf8 => &[],
            EncodingLabel::Utf8Bom => UTF8_BOM,
            EncodingLabel::Utf16Le => UTF16LE_BOM,
            EncodingLabel::Utf16Be => UTF16BE_BOM,
            EncodingLabel::Utf32Le => UTF32LE_BOM,
            EncodingLabel::Utf32Be => UTF32BE_BOM,
        }
    }
}

impl Display for EncodingLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncodingLabel {
    type Err = Error;

    /// Case-insensitive; dashes and underscores are ignored (`utf-16le` == `UTF16LE`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_uppercase();
        EncodingLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == normalized)
            .ok_or_else(|| Error::UnknownEncoding(s.to_string()))
    }
}

/// Outcome of sniffing one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingDecision {
    pub label: EncodingLabel,
    /// Number of BOM bytes skipped before content.
    pub bom_length: usize,
}

impl EncodingDecision {
    fn with_bom(label: EncodingLabel) -> Self {
        EncodingDecision {
            label,
            bom_length: label.bom().len(),
        }
    }

    fn without_bom(label: EncodingLabel) -> Self {
        EncodingDecision {
            label,
            bom_length: 0,
        }
    }
}

/// UTF-8 view over a stream, as returned by [`detect`].
pub enum DecodedReader<R> {
    /// Content already is UTF-8 and is handed through untouched.
    Passthrough(R),
    /// UTF-8 decoded through `encoding_rs` with replacement characters.
    Transcoded(DecodeReaderBytes<R, Vec<u8>>),
    Utf16(Utf16Decoder<R>),
    Utf32(Utf32Decoder<R>),
}

impl<R> std::fmt::Debug for DecodedReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            DecodedReader::Passthrough(_) => "Passthrough",
            DecodedReader::Transcoded(_) => "Transcoded",
            DecodedReader::Utf16(_) => "Utf16",
            DecodedReader::Utf32(_) => "Utf32",
        };
        f.debug_tuple("DecodedReader").field(&kind).finish()
    }
}

impl<R: Read> Read for DecodedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            DecodedReader::Passthrough(r) => r.read(buf),
            DecodedReader::Transcoded(r) => r.read(buf),
            DecodedReader::Utf16(r) => r.read(buf),
            DecodedReader::Utf32(r) => r.read(buf),
        }
    }
}

/// Detects the encoding of `stream` and returns a reader yielding UTF-8.
///
/// A BOM always wins. Without one, `explicit_encoding` names the encoding to use; when it
/// is absent the content is probed and finally assumed to be UTF-8. The returned reader
/// starts right after the BOM. A zero-length stream is handed back untouched as `UTF8`.
pub fn detect<R: Read + Seek>(
    mut stream: R,
    explicit_encoding: Option<&str>,
) -> Result<(DecodedReader<R>, EncodingDecision), Error> {
    let explicit_encoding = explicit_encoding.filter(|name| !name.is_empty());

    let mut head = Vec::with_capacity(BOM_MAX_LEN);
    (&mut stream)
        .take(BOM_MAX_LEN as u64)
        .read_to_end(&mut head)?;

    if head.is_empty() {
        tracing::debug!("empty stream, nothing to decode");
        return Ok((
            DecodedReader::Passthrough(stream),
            EncodingDecision::without_bom(EncodingLabel::Utf8),
        ));
    }

    if let Some(label) = sniff_bom(&head) {
        let decision = EncodingDecision::with_bom(label);
        seek_to(&mut stream, decision.bom_length as u64)?;
        tracing::debug!(label = %label, bom_length = decision.bom_length, "detected BOM");
        let reader = match label {
            EncodingLabel::Utf8Bom => DecodedReader::Passthrough(stream),
            _ => decoder_for(stream, label),
        };
        return Ok((reader, decision));
    }

    seek_to(&mut stream, 0)?;

    if explicit_encoding.is_none() {
        let mut probe = Vec::with_capacity(PROBE_LEN);
        (&mut stream)
            .take(PROBE_LEN as u64)
            .read_to_end(&mut probe)?;
        seek_to(&mut stream, 0)?;

        if probe.is_empty() || is_utf8_probe(&probe) {
            tracing::debug!(probed = probe.len(), "content probed as UTF-8");
            return Ok((
                DecodedReader::Passthrough(stream),
                EncodingDecision::without_bom(EncodingLabel::Utf8),
            ));
        }
        tracing::warn!(
            probed = probe.len(),
            "content is not valid UTF-8, decoding with replacement characters"
        );
    }

    let label = match explicit_encoding.map(str::parse::<EncodingLabel>).transpose()? {
        // No BOM was found, so none is skipped or reported.
        Some(EncodingLabel::Utf8Bom) | None => EncodingLabel::Utf8,
        Some(label) => label,
    };
    tracing::debug!(label = %label, explicit = explicit_encoding.is_some(), "using named encoding");
    Ok((
        decoder_for(stream, label),
        EncodingDecision::without_bom(label),
    ))
}

/// Reads a whole file into a `String`, decoding it with [`detect`].
pub fn read_to_string<P: AsRef<Path>>(
    path: P,
    explicit_encoding: Option<&str>,
) -> Result<(String, EncodingDecision), Error> {
    let file = File::open(path).map_err(Error::Io)?;
    let (mut reader, decision) = detect(file, explicit_encoding)?;
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(Error::Io)?;
    Ok((text, decision))
}

fn sniff_bom(head: &[u8]) -> Option<EncodingLabel> {
    // UTF-16LE's BOM prefixes UTF-32LE's; a NUL pair right after FF FE is read as UTF-32.
    [
        EncodingLabel::Utf8Bom,
        EncodingLabel::Utf32Le,
        EncodingLabel::Utf32Be,
        EncodingLabel::Utf16Le,
        EncodingLabel::Utf16Be,
    ]
    .into_iter()
    .find(|label| head.starts_with(label.bom()))
}

/// A probe is UTF-8 when every byte decodes, or when decoding only stops at an
/// incomplete sequence cut by the probe window.
fn is_utf8_probe(probe: &[u8]) -> bool {
    match std::str::from_utf8(probe) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none() && e.valid_up_to() >= PROBE_LEN - UTF8_MAX_WIDTH,
    }
}

fn seek_to<S: Seek>(stream: &mut S, position: u64) -> Result<(), Error> {
    let reached = stream
        .seek(SeekFrom::Start(position))
        .map_err(Error::Seek)?;
    if reached != position {
        return Err(Error::Seek(io::Error::other(format!(
            "expected position {}, reached {}",
            position, reached
        ))));
    }
    Ok(())
}

fn decoder_for<R: Read>(stream: R, label: EncodingLabel) -> DecodedReader<R> {
    match label {
        EncodingLabel::Utf8 | EncodingLabel::Utf8Bom => transcode(stream, encoding_rs::UTF_8),
        EncodingLabel::Utf16Le => DecodedReader::Utf16(Utf16Decoder::new(stream, false)),
        EncodingLabel::Utf16Be => DecodedReader::Utf16(Utf16Decoder::new(stream, true)),
        EncodingLabel::Utf32Le => DecodedReader::Utf32(Utf32Decoder::new(stream, false)),
        EncodingLabel::Utf32Be => DecodedReader::Utf32(Utf32Decoder::new(stream, true)),
    }
}

fn transcode<R: Read>(stream: R, encoding: &'static encoding_rs::Encoding) -> DecodedReader<R> {
    // BOMs were sniffed already; content bytes must not be taken for one.
    DecodedReader::Transcoded(
        DecodeReaderBytesBuilder::new()
            .encoding(Some(encoding))
            .bom_sniffing(false)
            .build(stream),
    )
}

/// Decodes UTF-16 into UTF-8 through `encoding_rs`, without replacement characters.
///
/// Unpaired surrogates, and an odd trailing byte at end of input, surface as
/// [`io::ErrorKind::InvalidData`].
pub struct Utf16Decoder<R> {
    inner: R,
    decoder: Decoder,
    consumed: usize,
    decoded: Vec<u8>,
    pos: usize,
    finished: bool,
}

impl<R: Read> Utf16Decoder<R> {
    pub fn new(inner: R, big_endian: bool) -> Self {
        let encoding = if big_endian {
            encoding_rs::UTF_16BE
        } else {
            encoding_rs::UTF_16LE
        };
        Utf16Decoder {
            inner,
            decoder: encoding.new_decoder_without_bom_handling(),
            consumed: 0,
            decoded: Vec::new(),
            pos: 0,
            finished: false,
        }
    }

    /// Decodes the next chunk. Returns false once the input is exhausted.
    fn fill(&mut self) -> io::Result<bool> {
        self.decoded.clear();
        self.pos = 0;
        if self.finished {
            return Ok(false);
        }

        let mut chunk = [0u8; DECODE_CHUNK];
        let n = loop {
            match self.inner.read(&mut chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        // An empty read still goes through the decoder so a dangling unit is reported.
        let last = n == 0;
        let src = &chunk[..n];

        let mut dst = [0u8; DECODE_CHUNK];
        let mut total_read = 0;
        loop {
            let (result, read, written) = self.decoder.decode_to_utf8_without_replacement(
                &src[total_read..],
                &mut dst,
                last,
            );
            total_read += read;
            self.decoded.extend_from_slice(&dst[..written]);
            match result {
                DecoderResult::InputEmpty => break,
                DecoderResult::OutputFull => continue,
                DecoderResult::Malformed(len, after) => {
                    let at = (self.consumed + total_read)
                        .saturating_sub(usize::from(len) + usize::from(after));
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!(
                            "malformed {} sequence at byte {}",
                            self.decoder.encoding().name(),
                            at
                        ),
                    ));
                }
            }
        }
        self.consumed += total_read;
        self.finished = last;
        Ok(true)
    }
}

impl<R: Read> Read for Utf16Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos >= self.decoded.len() {
            if !self.fill()? {
                return Ok(0);
            }
        }
        let available = &self.decoded[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}

/// Decodes UTF-32 code units into UTF-8. `encoding_rs` has no UTF-32 support.
///
/// Code units that are not Unicode scalar values, and a truncated unit at end of input,
/// surface as [`io::ErrorKind::InvalidData`].
pub struct Utf32Decoder<R> {
    inner: R,
    big_endian: bool,
    pending: Vec<u8>,
    decoded: Vec<u8>,
    pos: usize,
}

impl<R: Read> Utf32Decoder<R> {
    pub fn new(inner: R, big_endian: bool) -> Self {
        Utf32Decoder {
            inner,
            big_endian,
            pending: Vec::with_capacity(4),
            decoded: Vec::new(),
            pos: 0,
        }
    }

    /// Decodes the next chunk. Returns false once the input is exhausted.
    fn fill(&mut self) -> io::Result<bool> {
        self.decoded.clear();
        self.pos = 0;

        let mut chunk = [0u8; DECODE_CHUNK];
        let n = loop {
            match self.inner.read(&mut chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        if n == 0 {
            if self.pending.is_empty() {
                return Ok(false);
            }
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("truncated UTF-32 code unit {:02X?}", self.pending),
            ));
        }

        self.pending.extend_from_slice(&chunk[..n]);
        let whole = self.pending.len() / 4 * 4;
        let mut utf8 = [0u8; 4];
        for unit in self.pending[..whole].chunks_exact(4) {
            let bytes = [unit[0], unit[1], unit[2], unit[3]];
            let value = if self.big_endian {
                u32::from_be_bytes(bytes)
            } else {
                u32::from_le_bytes(bytes)
            };
            let c = char::from_u32(value).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("invalid UTF-32 code unit {:#010X}", value),
                )
            })?;
            self.decoded
                .extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
        }
        self.pending.drain(..whole);
        Ok(true)
    }
}

impl<R: Read> Read for Utf32Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos >= self.decoded.len() {
            if !self.fill()? {
                return Ok(0);
            }
        }
        let available = &self.decoded[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}

/// Writer taking UTF-8 and emitting `label`'s encoding into `sink`.
///
/// The BOM is written once when the writer is opened. A multi-byte UTF-8 sequence split
/// across two `write` calls is held back until it is complete.
#[derive(Debug)]
pub struct EncodedWriter<W: Write> {
    sink: W,
    label: EncodingLabel,
    pending: Vec<u8>,
}

/// Opens a transcoding writer over `sink` and writes the BOM of `label`, if any.
pub fn open_writer<W: Write>(mut sink: W, label: EncodingLabel) -> Result<EncodedWriter<W>, Error> {
    sink.write_all(label.bom())?;
    tracing::debug!(label = %label, "opened encoded writer");
    Ok(EncodedWriter {
        sink,
        label,
        pending: Vec::new(),
    })
}

/// [`open_writer`] with the encoding given by name (`UTF8`, `UTF8BOM`, `UTF16LE`, ...).
pub fn open_writer_by_name<W: Write>(
    sink: W,
    encoding_name: &str,
) -> Result<EncodedWriter<W>, Error> {
    open_writer(sink, encoding_name.parse()?)
}

/// Converts a UTF-8 buffer to `label`'s encoding, BOM included.
pub fn convert_buffer(buf: &[u8], label: EncodingLabel) -> Result<Vec<u8>, Error> {
    let mut writer = open_writer(Vec::with_capacity(buf.len() + 4), label)?;
    writer.write_all(buf)?;
    writer.finish()
}

impl<W: Write> EncodedWriter<W> {
    pub fn label(&self) -> EncodingLabel {
        self.label
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Flushes and returns the sink. Fails if an incomplete UTF-8 sequence is still held.
    pub fn finish(mut self) -> Result<W, Error> {
        if !self.pending.is_empty() {
            return Err(Error::Encode(format!(
                "incomplete UTF-8 sequence {:02X?} at end of input",
                self.pending
            )));
        }
        self.sink.flush()?;
        Ok(self.sink)
    }
}

impl<W: Write> Write for EncodedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if matches!(self.label, EncodingLabel::Utf8 | EncodingLabel::Utf8Bom) {
            self.sink.write_all(buf)?;
            return Ok(buf.len());
        }

        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(buf);
        let complete = match std::str::from_utf8(&input) {
            Ok(text) => text.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                let message = format!(
                    "unable to convert {:?} to {}: invalid UTF-8 at byte {}",
                    input,
                    self.label,
                    e.valid_up_to()
                );
                // Nothing from `buf` was consumed; keep what was held before.
                input.truncate(input.len() - buf.len());
                self.pending = input;
                return Err(io::Error::new(io::ErrorKind::InvalidData, message));
            }
        };
        let text = std::str::from_utf8(&input[..complete])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let encoded = encode_text(text, self.label);
        self.sink.write_all(&encoded).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("unable to write {} encoded bytes: {}", encoded.len(), e),
            )
        })?;
        self.pending = input[complete..].to_vec();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

fn encode_text(text: &str, label: EncodingLabel) -> Vec<u8> {
    match label {
        EncodingLabel::Utf8 | EncodingLabel::Utf8Bom => text.as_bytes().to_vec(),
        EncodingLabel::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        EncodingLabel::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        EncodingLabel::Utf32Le => text.chars().flat_map(|c| (c as u32).to_le_bytes()).collect(),
        EncodingLabel::Utf32Be => text.chars().flat_map(|c| (c as u32).to_be_bytes()).collect(),
    }
}
