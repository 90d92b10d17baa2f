//! DNS message representation.
//!
//! A DNS message consists of a header carrying at most one question, and
//! three resource record sections (answer, authority, additional). In an
//! UPDATE message the answer section holds the prerequisites and the
//! authority section holds the updates (RFC 2136 Section 2).

use crate::error::{Error, Result};
use crate::header::{HEADER_SIZE, Header, HeaderFlags};
use crate::name::Name;
use crate::opcode::OpCode;
use crate::question::Question;
use crate::rcode::ResponseCode;
use crate::record::ResourceRecord;
use crate::wire::{WireReader, WireWriter};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest possible encoded record: root name plus the fixed fields.
const MIN_RECORD_SIZE: usize = 11;

/// A message section, as named in count errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    /// The question (zone) section.
    Question,
    /// The answer (prerequisite) section.
    Answer,
    /// The authority (update) section.
    Authority,
    /// The additional section.
    Additional,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Question => "question",
            Self::Answer => "answer",
            Self::Authority => "authority",
            Self::Additional => "additional",
        })
    }
}

/// A complete DNS message.
///
/// The header counts are not recomputed on encode. The `add_*` methods keep
/// them in step; anything that edits a section through the `*_mut`
/// accessors must fix the header too, or encoding fails with
/// [`Error::InconsistentRecordCount`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The message header and question.
    header: Header,
    /// The answer section.
    answers: Vec<ResourceRecord>,
    /// The authority section.
    authority: Vec<ResourceRecord>,
    /// The additional section.
    additional: Vec<ResourceRecord>,
}

impl Message {
    /// Creates a new message with empty sections.
    pub fn new(header: Header) -> Self {
        Self {
            header,
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    /// Creates a query message with a random ID.
    pub fn query(question: Question) -> Self {
        let mut header = Header::with_question(OpCode::Query, question);
        header.set_flag(HeaderFlags::RD, true);
        Self::new(header)
    }

    /// Creates an UPDATE message for the zone at `origin`.
    pub fn update(origin: Name) -> Self {
        Self::new(Header::with_question(OpCode::Update, Question::zone(origin)))
    }

    /// Creates an empty response to a request.
    pub fn response_from(request: &Message) -> Self {
        Self::new(Header::response_from(&request.header))
    }

    // =========================================================================
    // Header accessors
    // =========================================================================

    /// Returns the message header.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns a mutable reference to the header.
    #[inline]
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Returns the message ID.
    #[inline]
    pub fn id(&self) -> u16 {
        self.header.id
    }

    /// Sets the message ID.
    #[inline]
    pub fn set_id(&mut self, id: u16) {
        self.header.id = id;
    }

    /// Returns the opcode.
    #[inline]
    pub fn opcode(&self) -> OpCode {
        self.header.opcode
    }

    /// Returns the response code.
    #[inline]
    pub fn rcode(&self) -> ResponseCode {
        self.header.rcode
    }

    /// Sets the response code.
    #[inline]
    pub fn set_rcode(&mut self, rcode: ResponseCode) {
        self.header.rcode = rcode;
    }

    /// Returns true if this is a response.
    #[inline]
    pub fn is_response(&self) -> bool {
        self.header.is_response()
    }

    // =========================================================================
    // Sections
    // =========================================================================

    /// Returns the question, if any.
    #[inline]
    pub fn question(&self) -> Option<&Question> {
        self.header.question.as_ref()
    }

    /// Returns the answer section.
    #[inline]
    pub fn answers(&self) -> &[ResourceRecord] {
        &self.answers
    }

    /// Returns the authority section.
    #[inline]
    pub fn authority(&self) -> &[ResourceRecord] {
        &self.authority
    }

    /// Returns the additional section.
    #[inline]
    pub fn additional(&self) -> &[ResourceRecord] {
        &self.additional
    }

    /// Returns the prerequisites of an UPDATE message.
    #[inline]
    pub fn prerequisites(&self) -> &[ResourceRecord] {
        &self.answers
    }

    /// Returns the updates of an UPDATE message.
    #[inline]
    pub fn updates(&self) -> &[ResourceRecord] {
        &self.authority
    }

    /// Direct access to the answer section. Does not touch the header.
    #[inline]
    pub fn answers_mut(&mut self) -> &mut Vec<ResourceRecord> {
        &mut self.answers
    }

    /// Direct access to the authority section. Does not touch the header.
    #[inline]
    pub fn authority_mut(&mut self) -> &mut Vec<ResourceRecord> {
        &mut self.authority
    }

    /// Direct access to the additional section. Does not touch the header.
    #[inline]
    pub fn additional_mut(&mut self) -> &mut Vec<ResourceRecord> {
        &mut self.additional
    }

    /// Adds an answer record.
    pub fn add_answer(&mut self, record: ResourceRecord) {
        self.answers.push(record);
        self.header.an_count = count_of(&self.answers);
    }

    /// Adds answer records.
    pub fn add_answers(&mut self, records: impl IntoIterator<Item = ResourceRecord>) {
        self.answers.extend(records);
        self.header.an_count = count_of(&self.answers);
    }

    /// Adds an authority record.
    pub fn add_authority(&mut self, record: ResourceRecord) {
        self.authority.push(record);
        self.header.ns_count = count_of(&self.authority);
    }

    /// Adds an additional record.
    pub fn add_additional(&mut self, record: ResourceRecord) {
        self.additional.push(record);
        self.header.ar_count = count_of(&self.additional);
    }

    /// Adds a prerequisite to an UPDATE message.
    #[inline]
    pub fn add_prerequisite(&mut self, record: ResourceRecord) {
        self.add_answer(record);
    }

    /// Adds an update to an UPDATE message.
    #[inline]
    pub fn add_update(&mut self, record: ResourceRecord) {
        self.add_authority(record);
    }

    /// Checks every header count against its section.
    pub fn validate_counts(&self) -> Result<()> {
        let question = usize::from(self.header.question.is_some());
        check_count(Section::Question, self.header.qd_count, question)?;
        check_count(Section::Answer, self.header.an_count, self.answers.len())?;
        check_count(Section::Authority, self.header.ns_count, self.authority.len())?;
        check_count(Section::Additional, self.header.ar_count, self.additional.len())
    }

    // =========================================================================
    // Wire format
    // =========================================================================

    /// Decodes a complete message.
    ///
    /// Bytes after the last record of the additional section are ignored.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = WireReader::new(data);
        let header = Header::decode(&mut reader)?;

        let answers = read_section(&mut reader, header.an_count)?;
        let authority = read_section(&mut reader, header.ns_count)?;
        let additional = read_section(&mut reader, header.ar_count)?;

        let message = Self {
            header,
            answers,
            authority,
            additional,
        };
        message.validate_counts()?;
        Ok(message)
    }

    /// Encodes the message, failing before any output if a count is off.
    pub fn encode(&self, writer: &mut WireWriter) -> Result<()> {
        self.validate_counts()?;
        self.header.encode(writer)?;
        for record in self
            .answers
            .iter()
            .chain(&self.authority)
            .chain(&self.additional)
        {
            record.encode(writer)?;
        }
        Ok(())
    }

    /// Converts the message to wire format bytes.
    pub fn to_wire(&self) -> Result<Bytes> {
        let mut writer = WireWriter::new(crate::MAX_UDP_MESSAGE_SIZE);
        self.encode(&mut writer)?;
        Ok(writer.freeze())
    }

    /// Encodes the message into a fixed buffer, returning the bytes used.
    ///
    /// Fails with [`Error::BufferTooSmall`] if the message does not fit;
    /// `buf` is left untouched in that case.
    pub fn write_into(&self, buf: &mut [u8]) -> Result<usize> {
        let mut writer = WireWriter::with_max_size(buf.len());
        self.encode(&mut writer)?;
        let len = writer.len();
        buf[..len].copy_from_slice(writer.as_bytes());
        Ok(len)
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new(Header::default())
    }
}

fn count_of(records: &[ResourceRecord]) -> u16 {
    u16::try_from(records.len()).unwrap_or(u16::MAX)
}

fn check_count(section: Section, header: u16, actual: usize) -> Result<()> {
    if usize::from(header) == actual {
        Ok(())
    } else {
        Err(Error::InconsistentRecordCount {
            section,
            header,
            actual,
        })
    }
}

fn read_section(reader: &mut WireReader<'_>, count: u16) -> Result<Vec<ResourceRecord>> {
    let capacity = usize::from(count).min(reader.remaining() / MIN_RECORD_SIZE);
    let mut records = Vec::with_capacity(capacity);
    for _ in 0..count {
        records.push(ResourceRecord::decode(reader)?);
    }
    Ok(records)
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let update = self.header.opcode == OpCode::Update;
        let (question, answer, authority) = if update {
            ("ZONE", "PREREQUISITE", "UPDATE")
        } else {
            ("QUESTION", "ANSWER", "AUTHORITY")
        };

        writeln!(f, ";; ->>HEADER<<- {}", self.header)?;

        writeln!(f, "\n;; {question} SECTION:")?;
        if let Some(q) = &self.header.question {
            writeln!(f, ";{q}")?;
        }

        for (title, records) in [
            (answer, &self.answers),
            (authority, &self.authority),
            ("ADDITIONAL", &self.additional),
        ] {
            if !records.is_empty() {
                writeln!(f, "\n;; {title} SECTION:")?;
                for r in records {
                    writeln!(f, "{r}")?;
                }
            }
        }

        Ok(())
    }
}
