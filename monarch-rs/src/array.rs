//! ndarray views of records and payloads.
//!
//! Enabled with the `ndarray` feature. A record becomes a
//! `channels × record_size` matrix, one row per channel.

use ndarray::{Array2, ArrayView2};

use crate::error::{Error, Result};
use crate::record::{Payload, Record};

impl Record {
    /// The record as a `(channels, record_size)` array.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use monarch_rs::{AccessMode, FileSession, NextOutcome};
    ///
    /// let session = FileSession::new();
    /// session.open("run.mon", AccessMode::Read)?;
    /// if let NextOutcome::Record(record) = session.next()? {
    ///     let samples = record.to_array()?;
    ///     println!("shape {:?}", samples.shape());
    /// }
    /// # Ok::<(), monarch_rs::Error>(())
    /// ```
    pub fn to_array(&self) -> Result<Array2<u8>> {
        let shape = (self.channel_count(), self.record_size());
        let bytes = shape.0 * shape.1;
        Array2::from_shape_vec(shape, self.data()?).map_err(|_| Error::Allocation { bytes })
    }
}

impl<'a> Payload<'a> {
    /// A payload viewing a 2-D array.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] if the array isn't contiguous in row-major
    /// order, since its bytes can't be borrowed as one slice.
    pub fn from_array(array: ArrayView2<'a, u8>) -> Result<Self> {
        let (rows, cols) = array.dim();
        match array.to_slice() {
            Some(data) => Ok(Payload::new(rows, cols, data)),
            None => Err(Error::ShapeMismatch {
                expected_cols: cols as u64,
                rows,
                cols,
                len: 0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_payload_from_row_array() {
        let array = Array2::<u8>::from_elem((1, 8), 3);
        let payload = Payload::from_array(array.view()).unwrap();
        assert_eq!(payload.rows(), 1);
        assert_eq!(payload.cols(), 8);
        assert_eq!(payload.data(), &[3u8; 8]);
    }

    #[test]
    fn test_transposed_view_rejected() {
        let array = Array2::<u8>::zeros((4, 2));
        let transposed = array.t();
        assert!(Payload::from_array(transposed).is_err());
    }
}
