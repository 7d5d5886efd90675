use bytes::Bytes;

const DEFAULT_EXTENSION: &str = "wav";

/// One uploaded audio file, alive for the duration of a single request.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    filename: String,
    data: Bytes,
}

impl AudioUpload {
    pub fn new(filename: impl Into<String>, data: Bytes) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Container hint taken from the text after the last `.` of the filename.
    pub fn extension(&self) -> &str {
        match self.filename.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext,
            _ => DEFAULT_EXTENSION,
        }
    }
}
