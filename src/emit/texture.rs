use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{DecompileError, Result};
use crate::mdl::texture::Texture;

const FILE_HEADER_SIZE: u32 = 14;
const DIB_HEADER_SIZE: u32 = 40;
const PALETTE_SIZE: u32 = 256 * 4;
const PIXEL_DATA_OFFSET: u32 = FILE_HEADER_SIZE + DIB_HEADER_SIZE + PALETTE_SIZE;

fn row_stride(width: u32) -> u32 {
    (width + 3) & !3
}

/// Writes `texture` out as an 8-bit paletted BMP: its raster is the raw
/// palette indices, untouched, so no bit-depth conversion happens here.
fn write_paletted_bmp<W: Write>(out: &mut W, texture: &Texture) -> std::io::Result<()> {
    let stride = row_stride(texture.width);
    let pixel_data_size = stride * texture.height;
    let file_size = PIXEL_DATA_OFFSET + pixel_data_size;

    out.write_all(b"BM")?;
    out.write_u32::<LittleEndian>(file_size)?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(PIXEL_DATA_OFFSET)?;

    out.write_u32::<LittleEndian>(DIB_HEADER_SIZE)?;
    out.write_i32::<LittleEndian>(texture.width as i32)?;
    out.write_i32::<LittleEndian>(texture.height as i32)?;
    out.write_u16::<LittleEndian>(1)?;
    out.write_u16::<LittleEndian>(8)?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(pixel_data_size)?;
    out.write_i32::<LittleEndian>(0)?;
    out.write_i32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(256)?;
    out.write_u32::<LittleEndian>(0)?;

    for [r, g, b] in texture.palette {
        out.write_all(&[b, g, r, 0])?;
    }

    let pad = vec![0u8; (stride - texture.width) as usize];
    for y in (0..texture.height).rev() {
        let row_start = (y * texture.width) as usize;
        let row_end = row_start + texture.width as usize;
        out.write_all(&texture.indices[row_start..row_end])?;
        if !pad.is_empty() {
            out.write_all(&pad)?;
        }
    }

    Ok(())
}

/// Writes a paletted BMP per texture into `dest_dir`, one file per entry
/// in `textures`, using each texture's own stored 256-entry palette.
pub fn emit_textures(dest_dir: &Path, textures: &[Texture]) -> Result<()> {
    fs::create_dir_all(dest_dir).map_err(|source| DecompileError::Io {
        path: dest_dir.to_path_buf(),
        source,
    })?;

    for texture in textures {
        let path = dest_dir.join(&texture.name);
        let file = File::create(&path).map_err(|source| DecompileError::Io {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        write_paletted_bmp(&mut writer, texture).map_err(|source| DecompileError::Io {
            path: path.clone(),
            source,
        })?;
        writer.flush().map_err(|source| DecompileError::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("texture: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_pixel_texture(name: &str) -> Texture {
        let mut palette = [[0u8; 3]; 256];
        palette[5] = [10, 20, 30];
        Texture {
            name: name.to_string(),
            flags: 0,
            width: 1,
            height: 1,
            indices: vec![5],
            palette,
        }
    }

    #[test]
    fn writes_one_bmp_per_texture() {
        let dir = std::env::temp_dir().join(format!("mdldec-texture-test-{}", std::process::id()));
        let textures = vec![one_pixel_texture("plate.bmp")];
        emit_textures(&dir, &textures).unwrap();
        assert!(dir.join("plate.bmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn paletted_bmp_header_reports_eight_bits_per_pixel() {
        let mut buf = Vec::new();
        write_paletted_bmp(&mut buf, &one_pixel_texture("plate.bmp")).unwrap();
        assert_eq!(&buf[0..2], b"BM");
        let bpp = u16::from_le_bytes([buf[28], buf[29]]);
        assert_eq!(bpp, 8);
        let colors_used = u32::from_le_bytes([buf[46], buf[47], buf[48], buf[49]]);
        assert_eq!(colors_used, 256);
    }

    #[test]
    fn row_stride_pads_to_a_multiple_of_four() {
        assert_eq!(row_stride(1), 4);
        assert_eq!(row_stride(4), 4);
        assert_eq!(row_stride(5), 8);
    }
}
