//! Compressed texture conversion

use vobforge_core::{ForgeError, Result};
use vobforge_decode::TextureRecord;
use vobforge_scene::{TextureAsset, TextureFormat};

const DDS_MAGIC: u32 = 0x2053_4444; // "DDS "
const FOURCC_DXT1: u32 = 0x3154_5844;
const FOURCC_DXT3: u32 = 0x3354_5844;
const FOURCC_DXT5: u32 = 0x3554_5844;

const PIXEL_FLAG_FOURCC: u32 = 0x4;
const FLAG_LINEAR_SIZE: u32 = 0x0008_0000;

/// Convert a decoded DDS surface.
///
/// DXT1 and DXT5 keep their compressed mip chain. DXT3 is taken from the
/// decoder's decompressed RGBA pixels as a single level.
pub fn convert_texture(name: &str, record: &TextureRecord) -> Result<TextureAsset> {
    let header = &record.header;
    if header.magic != DDS_MAGIC {
        return Err(ForgeError::DecodeError(format!(
            "{}: invalid file magic {:#010x}",
            name, header.magic
        )));
    }
    if header.pixel_flags & PIXEL_FLAG_FOURCC == 0 {
        return Err(ForgeError::DecodeError(format!("{}: four-CC not specified", name)));
    }

    let mip_count = header.mip_map_count.max(1);

    if header.four_cc == FOURCC_DXT3 {
        let expected = header.width as usize * header.height as usize * 4;
        let rgba = record.rgba.as_ref().ok_or_else(|| {
            ForgeError::DecodeError(format!("{}: DXT3 surface was not decompressed", name))
        })?;
        if rgba.len() < expected {
            return Err(ForgeError::DecodeError(format!(
                "{}: {} bytes of RGBA data, expected {}",
                name,
                rgba.len(),
                expected
            )));
        }
        return Ok(TextureAsset {
            name: name.to_string(),
            width: header.width,
            height: header.height,
            format: TextureFormat::Rgba32,
            mip_count: 1,
            data: rgba[..expected].to_vec(),
        });
    }

    let format = match header.four_cc {
        FOURCC_DXT1 => TextureFormat::Dxt1,
        FOURCC_DXT5 => TextureFormat::Dxt5,
        other => {
            return Err(ForgeError::DecodeError(format!(
                "{}: unsupported four-CC {:#010x}",
                name, other
            )))
        }
    };

    let mut level = header.pitch_or_linear_size as u64;
    if header.flags & FLAG_LINEAR_SIZE == 0 {
        level *= header.height as u64;
    }
    let mut size = 0u64;
    for _ in 0..mip_count {
        size += level;
        level /= 4;
    }
    if size == 0 {
        return Err(ForgeError::DecodeError(format!("{}: empty surface", name)));
    }
    let size = usize::try_from(size)
        .map_err(|_| ForgeError::DecodeError(format!("{}: surface too large", name)))?;
    if record.payload.len() < size {
        return Err(ForgeError::DecodeError(format!(
            "{}: payload has {} bytes, mip chain needs {}",
            name,
            record.payload.len(),
            size
        )));
    }

    Ok(TextureAsset {
        name: name.to_string(),
        width: header.width,
        height: header.height,
        format,
        mip_count,
        data: record.payload[..size].to_vec(),
    })
}
