use std::{fs, path::Path};

use rowconv_image::{ImageSize, Rgb8};

use crate::error::IoError;

/// The only sample range supported, one byte per channel.
const PPM_MAXVAL: usize = 255;

/// The pixmap encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PpmFormat {
    /// `P3`, ASCII samples.
    Plain,
    /// `P6`, binary samples.
    Raw,
}

/// Cursor over the header tokens of a pixmap.
struct HeaderReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> HeaderReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    // whitespace and `#` comments may appear between any two header tokens
    fn skip_separators(&mut self) {
        while let Some(&b) = self.data.get(self.pos) {
            if b == b'#' {
                while self.data.get(self.pos).is_some_and(|&b| b != b'\n') {
                    self.pos += 1;
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn token(&mut self, what: &str) -> Result<&'a [u8], IoError> {
        self.skip_separators();
        let start = self.pos;
        while self
            .data
            .get(self.pos)
            .is_some_and(|b| !b.is_ascii_whitespace() && *b != b'#')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(IoError::PpmDecodeError(format!("missing {what}")));
        }
        Ok(&self.data[start..self.pos])
    }

    fn number(&mut self, what: &str) -> Result<usize, IoError> {
        let token = self.token(what)?;
        std::str::from_utf8(token)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| {
                IoError::PpmDecodeError(format!(
                    "invalid {what}: {}",
                    String::from_utf8_lossy(token)
                ))
            })
    }
}

/// Decode a PPM image from memory.
///
/// Both the binary (`P6`) and ASCII (`P3`) variants are accepted. The maximum sample value
/// must be 255. Bytes after the pixel data of a binary pixmap are ignored.
///
/// # Arguments
///
/// * `data` - The encoded pixmap.
///
/// # Returns
///
/// A RGB image with three channels (rgb8).
///
/// # Example
///
/// ```
/// use rowconv_io::ppm::decode_ppm;
///
/// let image = decode_ppm(b"P3\n# tiny\n2 1\n255\n255 0 0  0 0 255\n").unwrap();
///
/// assert_eq!(image.width(), 2);
/// assert_eq!(image.get_pixel(1, 0), [0, 0, 255]);
/// ```
pub fn decode_ppm(data: &[u8]) -> Result<Rgb8, IoError> {
    let mut header = HeaderReader::new(data);

    let format = match header.token("magic number")? {
        b"P6" => PpmFormat::Raw,
        b"P3" => PpmFormat::Plain,
        other => {
            return Err(IoError::PpmDecodeError(format!(
                "unsupported magic number: {}",
                String::from_utf8_lossy(other)
            )))
        }
    };

    let width = header.number("width")?;
    let height = header.number("height")?;
    let maxval = header.number("maxval")?;

    if width == 0 || height == 0 {
        return Err(IoError::PpmDecodeError(format!(
            "invalid dimensions {width}x{height}"
        )));
    }
    if maxval != PPM_MAXVAL {
        return Err(IoError::PpmDecodeError(format!(
            "unsupported maxval {maxval}, expected {PPM_MAXVAL}"
        )));
    }

    let num_values = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| IoError::PpmDecodeError(format!("image too large: {width}x{height}")))?;

    let pixels = match format {
        PpmFormat::Raw => {
            // a single whitespace byte separates the header from the samples
            let start = header.pos + 1;
            let end = start.saturating_add(num_values);
            let Some(samples) = data.get(start..end) else {
                return Err(IoError::PpmDecodeError(format!(
                    "truncated pixel data: expected {num_values} bytes, found {}",
                    data.len().saturating_sub(start)
                )));
            };
            samples.to_vec()
        }
        PpmFormat::Plain => {
            // every ASCII sample takes at least one digit
            let remaining = data.len().saturating_sub(header.pos);
            if num_values > remaining {
                return Err(IoError::PpmDecodeError(format!(
                    "truncated pixel data: expected {num_values} samples, found {remaining} bytes"
                )));
            }
            let mut samples = Vec::with_capacity(num_values);
            for _ in 0..num_values {
                let value = header.number("sample")?;
                if value > PPM_MAXVAL {
                    return Err(IoError::PpmDecodeError(format!(
                        "sample {value} exceeds maxval {PPM_MAXVAL}"
                    )));
                }
                samples.push(value as u8);
            }
            samples
        }
    };

    log::debug!("decoded {format:?} pixmap {width}x{height}");

    Ok(Rgb8::new(ImageSize { width, height }, pixels)?)
}

/// Encode an image as a binary (`P6`) PPM.
///
/// # Example
///
/// ```
/// use rowconv_image::Image;
/// use rowconv_io::ppm::encode_ppm;
///
/// let image = Image::<u8, 3>::from_size_val([1, 1].into(), 7).unwrap();
///
/// assert_eq!(encode_ppm(&image), b"P6\n1 1\n255\n\x07\x07\x07");
/// ```
pub fn encode_ppm(image: &Rgb8) -> Vec<u8> {
    let header = format!("P6\n{} {}\n{}\n", image.width(), image.height(), PPM_MAXVAL);
    let mut data = Vec::with_capacity(header.len() + image.as_slice().len());
    data.extend_from_slice(header.as_bytes());
    data.extend_from_slice(image.as_slice());
    data
}

/// Read a PPM image with three channels (rgb8).
///
/// # Arguments
///
/// * `file_path` - The path to the PPM file.
///
/// # Returns
///
/// A RGB image with three channels (rgb8).
pub fn read_image_ppm_rgb8(file_path: impl AsRef<Path>) -> Result<Rgb8, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let data = fs::read(file_path)?;
    decode_ppm(&data)
}

/// Write an image as a binary PPM file.
///
/// The image is fully encoded before the file is created. If writing fails, the partially
/// written file is removed.
///
/// # Arguments
///
/// * `file_path` - The path to the PPM file.
/// * `image` - The image to write.
pub fn write_image_ppm_rgb8(file_path: impl AsRef<Path>, image: &Rgb8) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    let data = encode_ppm(image);

    if let Err(e) = fs::write(file_path, &data) {
        if file_path.exists() {
            if let Err(remove_err) = fs::remove_file(file_path) {
                log::warn!(
                    "failed to remove partial output {}: {remove_err}",
                    file_path.display()
                );
            }
        }
        return Err(e.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowconv_image::Image;

    #[test]
    fn decode_raw() -> Result<(), IoError> {
        let mut data = b"P6\n2 2\n255\n".to_vec();
        data.extend(0u8..12);
        let image = decode_ppm(&data)?;
        assert_eq!(image.size(), ImageSize::from([2, 2]));
        assert_eq!(image.get_pixel(0, 1), [6, 7, 8]);
        Ok(())
    }

    #[test]
    fn decode_raw_with_comments_and_trailing_bytes() -> Result<(), IoError> {
        let mut data = b"P6 # created by hand\n# size\n1   1\n# depth\n255\n".to_vec();
        data.extend_from_slice(&[9, 8, 7, 0xff, 0xff]);
        let image = decode_ppm(&data)?;
        assert_eq!(image.as_slice(), &[9, 8, 7]);
        Ok(())
    }

    #[test]
    fn decode_raw_sample_looks_like_whitespace() -> Result<(), IoError> {
        // the first sample is a newline byte and must not be taken as a separator
        let data = b"P6\n1 1\n255\n\n\t ";
        let image = decode_ppm(data)?;
        assert_eq!(image.as_slice(), &[b'\n', b'\t', b' ']);
        Ok(())
    }

    #[test]
    fn decode_plain() -> Result<(), IoError> {
        let image = decode_ppm(b"P3\n2 1\n255\n1 2 3\n# row end\n4 5 6")?;
        assert_eq!(image.as_slice(), &[1, 2, 3, 4, 5, 6]);
        Ok(())
    }

    #[test]
    fn decode_errors() {
        let cases: [&[u8]; 9] = [
            b"",
            b"P5\n1 1\n255\n\0",
            b"P6\n1\n",
            b"P6\n0 1\n255\n",
            b"P6\n1 1\n65535\n\0\0\0\0\0\0",
            b"P6\n2 2\n255\n\0\0\0",
            b"P3\n1 1\n255\n1 2 300",
            b"P3\n4000000000000000000 1\n255\n1 2 3\n",
            b"P3\n100000 100000\n255\n1 2 3\n",
        ];
        for data in cases {
            assert!(
                matches!(decode_ppm(data), Err(IoError::PpmDecodeError(_))),
                "{}",
                String::from_utf8_lossy(data)
            );
        }
    }

    #[test]
    fn encode_decode() -> Result<(), IoError> {
        let image = Image::<u8, 3>::new([3, 2].into(), (0..18).collect())?;
        let decoded = decode_ppm(&encode_ppm(&image))?;
        assert_eq!(decoded, image);
        Ok(())
    }

    #[test]
    fn read_write_file() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("image.ppm");

        let image = Image::<u8, 3>::from_size_val([4, 5].into(), 200)?;
        write_image_ppm_rgb8(&file_path, &image)?;

        let read = read_image_ppm_rgb8(&file_path)?;
        assert_eq!(read, image);
        Ok(())
    }

    #[test]
    fn read_missing_file() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("missing.ppm");
        assert!(matches!(
            read_image_ppm_rgb8(&file_path),
            Err(IoError::FileDoesNotExist(p)) if p == file_path
        ));
        Ok(())
    }

    #[test]
    fn write_to_missing_dir() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("no_such_dir").join("out.ppm");
        let image = Image::<u8, 3>::from_size_val([1, 1].into(), 0)?;
        assert!(matches!(
            write_image_ppm_rgb8(&file_path, &image),
            Err(IoError::FileError(_))
        ));
        assert!(!file_path.exists());
        Ok(())
    }
}
