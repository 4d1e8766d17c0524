use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
    io::{copy, sink, Error as IoError, ErrorKind, Read},
    num::NonZeroUsize,
};

pub(crate) struct Reader<R: Read> {
    inner: R,
    position: usize,
}

impl<R: Read> Reader<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            inner: reader,
            position: 0,
        }
    }

    fn read_to_slice(&mut self, buf: &mut [u8]) -> ReadResult<()> {
        let mut filled = 0;

        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => {
                    filled += n;
                    self.position += n;
                }
                // this I/O error is non-fatal, so reading is retried
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Err(self.to_error(ReadErrorKind::Incomplete(Needed::Unknown)));
                }
                Err(e) => return Err(self.to_error_with_source(ReadErrorKind::Failure, e)),
            }
        }

        match NonZeroUsize::new(buf.len() - filled) {
            None => Ok(()),
            Some(missing) => Err(self.to_error(ReadErrorKind::Incomplete(Needed::Size(missing)))),
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn take_const<const LEN: usize>(&mut self) -> ReadResult<[u8; LEN]> {
        let mut buf = [0; LEN];
        self.read_to_slice(&mut buf)?;
        Ok(buf)
    }

    // Declared counts in corrupt banks can be huge, so the buffer only grows with the bytes
    // that are actually there, and skipped bytes are streamed into a sink.
    pub(crate) fn take(&mut self, len: usize) -> ReadResult<Vec<u8>> {
        let mut buf = Vec::new();
        let result = (&mut self.inner).take(len as u64).read_to_end(&mut buf);
        let read = result.map_err(|e| self.to_error_with_source(ReadErrorKind::Failure, e))?;

        self.position += read;

        match NonZeroUsize::new(len - read) {
            None => Ok(buf),
            Some(missing) => Err(self.to_error(ReadErrorKind::Incomplete(Needed::Size(missing)))),
        }
    }

    pub(crate) fn skip(&mut self, amount: usize) -> ReadResult<()> {
        let result = copy(&mut (&mut self.inner).take(amount as u64), &mut sink());
        let copied = result.map_err(|e| self.to_error_with_source(ReadErrorKind::Failure, e))?
            as usize;

        self.position += copied;

        match NonZeroUsize::new(amount - copied) {
            None => Ok(()),
            Some(missing) => Err(self.to_error(ReadErrorKind::Incomplete(Needed::Size(missing)))),
        }
    }

    pub(crate) fn advance_to(&mut self, position: usize) -> ReadResult<()> {
        match position.checked_sub(self.position) {
            Some(amount) => self.skip(amount),
            None => Err(self.to_error(ReadErrorKind::Overshot { target: position })),
        }
    }

    pub(crate) fn u8(&mut self) -> ReadResult<u8> {
        let [n] = self.take_const::<1>()?;
        Ok(n)
    }

    pub(crate) fn le_u16(&mut self) -> ReadResult<u16> {
        self.take_const().map(u16::from_le_bytes)
    }

    pub(crate) fn le_u32(&mut self) -> ReadResult<u32> {
        self.take_const().map(u32::from_le_bytes)
    }
}

pub(crate) type ReadResult<T> = Result<T, ReadError>;

#[derive(Debug)]
pub(crate) struct ReadError {
    position: usize,
    kind: ReadErrorKind,
    source: Option<IoError>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ReadErrorKind {
    Failure,
    Incomplete(Needed),
    Overshot { target: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Needed {
    Size(NonZeroUsize),
    Unknown,
}

impl<R: Read> Reader<R> {
    fn to_error(&self, kind: ReadErrorKind) -> ReadError {
        ReadError {
            position: self.position,
            kind,
            source: None,
        }
    }

    fn to_error_with_source(&self, kind: ReadErrorKind, source: IoError) -> ReadError {
        ReadError {
            position: self.position,
            kind,
            source: Some(source),
        }
    }
}

impl ReadError {
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    #[cfg(test)]
    pub(crate) fn is_kind(&self, kind: ReadErrorKind) -> bool {
        self.kind == kind
    }
}

impl Display for ReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.kind {
            ReadErrorKind::Failure => f.write_str("failed to read data due to I/O error"),
            ReadErrorKind::Incomplete(needed) => match needed {
                Needed::Size(size) => {
                    f.write_str(&format!("incomplete data: needed {size} more bytes to read"))
                }
                Needed::Unknown => f.write_str("incomplete data"),
            },
            ReadErrorKind::Overshot { target } => f.write_str(&format!(
                "declared boundary at byte {target} was already passed"
            )),
        }?;

        f.write_str(&format!(" - byte position {}", self.position))
    }
}

impl Error for ReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.source {
            Some(e) => Some(e),
            None => None,
        }
    }
}
