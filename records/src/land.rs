//! Terrain records (`LAND`).
//!
//! Bulk vertex data is not decoded when the record is read. [`Land::load`]
//! remembers where the data starts and [`Land::load_data`] decodes the
//! requested parts later from the same reader session.

use std::io::{Read, Seek, Write};

use defs::RecName;
use esm::{
    decode_padding, encode_padding, Composite, EsmError, EsmReader, EsmResult, EsmWriter, Record,
    ReaderContext,
};

pub const REC_LAND: RecName = RecName::new(*b"LAND");

/// Vertices along one side of a cell.
pub const LAND_SIZE: usize = 65;
pub const LAND_NUM_VERTS: usize = LAND_SIZE * LAND_SIZE;

/// Texture indices along one side of a cell.
pub const LAND_TEXTURE_SIZE: usize = 16;
pub const LAND_NUM_TEXTURES: usize = LAND_TEXTURE_SIZE * LAND_TEXTURE_SIZE;

/// Samples along one side of the global map heightmap.
pub const GLOBAL_MAP_LOD_SIZE_SQRT: usize = 9;
pub const GLOBAL_MAP_LOD_SIZE: usize = GLOBAL_MAP_LOD_SIZE_SQRT * GLOBAL_MAP_LOD_SIZE_SQRT;

/// World units per stored height step.
pub const HEIGHT_SCALE: f32 = 8.0;

/// Bits of [`Land::flags`].
pub mod land_flags {
    pub const HEIGHTS_NORMALS: i32 = 0x1;
    pub const COLORS: i32 = 0x2;
    pub const TEXTURES: i32 = 0x4;
}

/// Bits naming the bulk data blocks of a land record.
pub mod data_types {
    pub const VNML: i32 = 1;
    pub const VHGT: i32 = 2;
    pub const WNAM: i32 = 4;
    pub const VCLR: i32 = 8;
    pub const VTEX: i32 = 16;
    pub const ALL: i32 = VNML | VHGT | WNAM | VCLR | VTEX;
}

/// Decoded terrain data.
#[derive(Debug, Clone, PartialEq)]
pub struct LandData {
    /// Absolute vertex heights, row major.
    pub heights: Box<[f32; LAND_NUM_VERTS]>,
    pub min_height: f32,
    pub max_height: f32,
    /// Vertex normals as signed byte triples.
    pub normals: Box<[i8; LAND_NUM_VERTS * 3]>,
    /// Land texture indices, row major.
    pub textures: [u16; LAND_NUM_TEXTURES],
    /// Vertex colours as RGB triples.
    pub colours: Box<[u8; LAND_NUM_VERTS * 3]>,
    /// [`data_types`] bits decoded so far.
    pub data_loaded: i32,
}

impl Default for LandData {
    fn default() -> Self {
        Self {
            heights: Box::new([0.0; LAND_NUM_VERTS]),
            min_height: 0.0,
            max_height: 0.0,
            normals: Box::new([0; LAND_NUM_VERTS * 3]),
            textures: [0; LAND_NUM_TEXTURES],
            colours: Box::new([0; LAND_NUM_VERTS * 3]),
            data_loaded: 0,
        }
    }
}

/// Height block (`VHGT`): a base offset and per-vertex deltas.
struct HeightDeltas {
    offset: f32,
    deltas: Box<[i8; LAND_NUM_VERTS]>,
}

impl Composite for HeightDeltas {
    const SIZE: usize = 4 + LAND_NUM_VERTS + 3;

    fn encode(&self, out: &mut Vec<u8>) {
        self.offset.encode(out);
        self.deltas.encode(out);
        encode_padding(out, 3);
    }

    fn decode(input: &mut &[u8]) -> Self {
        let offset = f32::decode(input);
        let mut deltas = Box::new([0i8; LAND_NUM_VERTS]);
        for delta in deltas.iter_mut() {
            *delta = i8::decode(input);
        }
        decode_padding(input, 3);
        Self { offset, deltas }
    }
}

fn round_delta(diff: f32) -> i8 {
    if diff >= 0.0 {
        (diff + 0.5) as i8
    } else {
        (diff - 0.5) as i8
    }
}

impl HeightDeltas {
    fn from_heights(heights: &[f32; LAND_NUM_VERTS]) -> Self {
        let mut deltas = Box::new([0i8; LAND_NUM_VERTS]);
        let mut prev_row = heights[0];
        for row in 0..LAND_SIZE {
            let start = row * LAND_SIZE;
            deltas[start] = round_delta((heights[start] - prev_row) / HEIGHT_SCALE);
            prev_row = heights[start];
            let mut prev_col = prev_row;
            for index in start + 1..start + LAND_SIZE {
                deltas[index] = round_delta((heights[index] - prev_col) / HEIGHT_SCALE);
                prev_col = heights[index];
            }
        }
        Self {
            offset: heights[0] / HEIGHT_SCALE,
            deltas,
        }
    }

    /// Accumulates deltas into absolute heights, returning the extremes.
    fn to_heights(&self, heights: &mut [f32; LAND_NUM_VERTS]) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = -f32::MAX;
        let mut row_offset = self.offset;
        for row in 0..LAND_SIZE {
            let start = row * LAND_SIZE;
            row_offset += f32::from(self.deltas[start]);
            let mut col_offset = row_offset;
            for index in start..start + LAND_SIZE {
                if index != start {
                    col_offset += f32::from(self.deltas[index]);
                }
                let height = col_offset * HEIGHT_SCALE;
                heights[index] = height;
                min = min.min(height);
                max = max.max(height);
            }
        }
        (min, max)
    }
}

/// Swaps between the row-major texture layout and the 4x4 block order
/// used on disk. Applying it twice is the identity.
fn transpose_textures(input: &[u16; LAND_NUM_TEXTURES]) -> [u16; LAND_NUM_TEXTURES] {
    let mut out = [0u16; LAND_NUM_TEXTURES];
    let mut read = 0;
    for y1 in 0..4 {
        for x1 in 0..4 {
            for y2 in 0..4 {
                for x2 in 0..4 {
                    out[(y1 * 4 + y2) * 16 + x1 * 4 + x2] = input[read];
                    read += 1;
                }
            }
        }
    }
    out
}

/// Derives the low resolution global map heightmap from vertex heights.
#[must_use]
pub fn generate_wnam(heights: &[f32; LAND_NUM_VERTS]) -> [i8; GLOBAL_MAP_LOD_SIZE] {
    let vert_mult = (LAND_SIZE - 1) as f32 / GLOBAL_MAP_LOD_SIZE_SQRT as f32;
    let mut wnam = [0i8; GLOBAL_MAP_LOD_SIZE];
    for row in 0..GLOBAL_MAP_LOD_SIZE_SQRT {
        for col in 0..GLOBAL_MAP_LOD_SIZE_SQRT {
            let vertex_row = (row as f32 * vert_mult) as usize;
            let vertex_col = (col as f32 * vert_mult) as usize;
            let mut height = heights[vertex_row * LAND_SIZE + vertex_col];
            height /= if height > 0.0 { 128.0 } else { 16.0 };
            let height = height.clamp(f32::from(i8::MIN), f32::from(i8::MAX));
            wnam[row * GLOBAL_MAP_LOD_SIZE_SQRT + col] = height as i8;
        }
    }
    wnam
}

/// Decodes the bulk data blocks in `flags` that `data` does not
/// hold yet. The reader must be positioned at the first bulk sub-record.
pub fn load_land_record_data<R: Read + Seek>(
    flags: i32,
    r: &mut EsmReader<R>,
    data: &mut LandData,
) -> EsmResult<()> {
    let wanted = |data: &LandData, flag: i32| data.data_loaded & flag == 0 && flags & flag != 0;

    if r.is_next_sub(b"VNML")? {
        if wanted(data, data_types::VNML) {
            *data.normals = r.get_ht()?;
            data.data_loaded |= data_types::VNML;
        } else {
            r.skip_h_sub()?;
        }
    }

    if r.is_next_sub(b"VHGT")? {
        if wanted(data, data_types::VHGT) {
            let deltas: HeightDeltas = r.get_ht()?;
            let (min, max) = deltas.to_heights(&mut data.heights);
            data.min_height = min;
            data.max_height = max;
            data.data_loaded |= data_types::VHGT;
        } else {
            r.skip_h_sub()?;
        }
    }

    if r.is_next_sub(b"WNAM")? {
        r.skip_h_sub()?;
        // The map LOD is decoded with the record header into `Land::wnam`.
        if flags & data_types::WNAM != 0 {
            data.data_loaded |= data_types::WNAM;
        }
    }

    if r.is_next_sub(b"VCLR")? {
        if wanted(data, data_types::VCLR) {
            *data.colours = r.get_ht()?;
            data.data_loaded |= data_types::VCLR;
        } else {
            r.skip_h_sub()?;
        }
    }

    if r.is_next_sub(b"VTEX")? {
        if wanted(data, data_types::VTEX) {
            let vtex: [u16; LAND_NUM_TEXTURES] = r.get_ht()?;
            data.textures = transpose_textures(&vtex);
            data.data_loaded |= data_types::VTEX;
        } else {
            r.skip_h_sub()?;
        }
    }
    Ok(())
}

/// A cell's terrain.
#[derive(Debug, Clone, PartialEq)]
pub struct Land {
    pub flags: i32,
    /// Cell grid coordinates.
    pub x: i32,
    pub y: i32,
    /// [`data_types`] bits present in the record.
    pub data_types: i32,
    pub wnam: [i8; GLOBAL_MAP_LOD_SIZE],
    /// Where the bulk data starts, if the record was read from a stream.
    pub context: Option<ReaderContext>,
    pub land_data: Option<Box<LandData>>,
    pub record_flags: u32,
}

impl Default for Land {
    fn default() -> Self {
        Self {
            flags: 0,
            x: 0,
            y: 0,
            data_types: 0,
            wnam: [0; GLOBAL_MAP_LOD_SIZE],
            context: None,
            land_data: None,
            record_flags: 0,
        }
    }
}

impl Land {
    /// Resets to flat terrain with every data block present and loaded.
    pub fn blank(&mut self) {
        self.wnam = [0; GLOBAL_MAP_LOD_SIZE];

        let data = self.land_data.get_or_insert_with(Box::default);
        data.heights.fill(0.0);
        data.min_height = 0.0;
        data.max_height = 0.0;
        for normal in data.normals.chunks_exact_mut(3) {
            normal.copy_from_slice(&[0, 0, 127]);
        }
        data.textures.fill(0);
        data.colours.fill(255);
        data.data_loaded = data_types::ALL;

        self.data_types = data_types::ALL;
        self.context = None;
    }

    /// Marks `flags` blocks as present and loaded, allocating data if needed.
    pub fn add(&mut self, flags: i32) {
        let data = self.land_data.get_or_insert_with(Box::default);
        data.data_loaded |= flags;
        self.data_types |= flags;
    }

    /// Decodes the requested blocks from the stream the record was read
    /// from. `r` must be the reader session that loaded the record; its
    /// position is unchanged afterwards.
    pub fn load_data<R: Read + Seek>(&mut self, flags: i32, r: &mut EsmReader<R>) -> EsmResult<()> {
        let flags = flags & self.data_types;
        let data = self.land_data.get_or_insert_with(Box::default);
        if data.data_loaded & flags == flags {
            return Ok(());
        }
        let Some(context) = &self.context else {
            return Ok(());
        };
        let resume = r.get_context();
        r.restore_context(context)?;
        let loaded = load_land_record_data(flags, r, data);
        r.restore_context(&resume)?;
        loaded
    }

    pub fn unload_data(&mut self) {
        self.land_data = None;
    }

    #[must_use]
    pub fn is_data_loaded(&self, flags: i32) -> bool {
        self.land_data
            .as_ref()
            .is_some_and(|data| data.data_loaded & flags == flags)
    }

    /// Returns the decoded data if any of `flags` is present in the record.
    #[must_use]
    pub fn land_data(&self, flags: i32) -> Option<&LandData> {
        if flags & self.data_types == 0 {
            return None;
        }
        self.land_data.as_deref()
    }
}

impl Record for Land {
    const REC_NAME: RecName = REC_LAND;

    fn record_flags(&self) -> u32 {
        self.record_flags
    }

    fn save<W: Write + Seek>(&self, w: &mut EsmWriter<W>, deleted: bool) -> EsmResult<()> {
        w.write_hnt(b"INTV", &[self.x, self.y])?;
        w.write_hnt(b"DATA", &self.flags)?;
        if deleted {
            return w.write_deleted();
        }

        let Some(data) = &self.land_data else {
            return Ok(());
        };
        if self.data_types & data_types::VNML != 0 {
            w.write_hnt(b"VNML", &*data.normals)?;
        }
        if self.data_types & data_types::VHGT != 0 {
            w.write_hnt(b"VHGT", &HeightDeltas::from_heights(&data.heights))?;
        }
        if self.data_types & data_types::WNAM != 0 {
            w.write_hnt(b"WNAM", &generate_wnam(&data.heights))?;
        }
        if self.data_types & data_types::VCLR != 0 {
            w.write_hnt(b"VCLR", &*data.colours)?;
        }
        if self.data_types & data_types::VTEX != 0 {
            w.write_hnt(b"VTEX", &transpose_textures(&data.textures))?;
        }
        Ok(())
    }

    fn load<R: Read + Seek>(&mut self, r: &mut EsmReader<R>) -> EsmResult<bool> {
        self.record_flags = r.get_rec_flags();
        self.data_types = 0;

        let mut deleted = false;
        let mut has_location = false;
        while r.has_more_subs() {
            let name = r.get_sub_name()?;
            match name.as_bytes() {
                b"INTV" => {
                    let [x, y]: [i32; 2] = r.get_ht()?;
                    self.x = x;
                    self.y = y;
                    has_location = true;
                }
                b"DATA" => self.flags = r.get_ht()?,
                b"DELE" => {
                    r.skip_h_sub()?;
                    deleted = true;
                }
                _ => {
                    r.cache_sub_name();
                    break;
                }
            }
        }
        if !has_location {
            return Err(EsmError::MissingSubRecord {
                name: RecName::new(*b"INTV"),
                record: REC_LAND,
            });
        }

        self.context = Some(r.get_context());
        self.land_data = None;
        self.wnam = [0; GLOBAL_MAP_LOD_SIZE];

        while r.has_more_subs() {
            let name = r.get_sub_name()?;
            let flag = match name.as_bytes() {
                b"VNML" => data_types::VNML,
                b"VHGT" => data_types::VHGT,
                b"WNAM" => {
                    self.wnam = r.get_ht()?;
                    self.data_types |= data_types::WNAM;
                    continue;
                }
                b"VCLR" => data_types::VCLR,
                b"VTEX" => data_types::VTEX,
                _ => {
                    return Err(EsmError::UnexpectedTag {
                        expected: None,
                        found: name,
                        record: REC_LAND,
                    })
                }
            };
            r.skip_h_sub()?;
            self.data_types |= flag;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{load_fake, save_fake};
    use defs::CURRENT_SAVE_GAME_FORMAT_VERSION;
    use std::io::Cursor;

    fn sample_data() -> LandData {
        let mut data = LandData::default();
        for (i, height) in data.heights.iter_mut().enumerate() {
            let (row, col) = (i / LAND_SIZE, i % LAND_SIZE);
            *height = (row as f32 * 3.0 - col as f32 * 2.0) * HEIGHT_SCALE;
        }
        data.min_height = data.heights.iter().copied().fold(f32::MAX, f32::min);
        data.max_height = data.heights.iter().copied().fold(-f32::MAX, f32::max);
        for (i, normal) in data.normals.iter_mut().enumerate() {
            *normal = (i % 255) as i8;
        }
        for (i, texture) in data.textures.iter_mut().enumerate() {
            *texture = i as u16;
        }
        for (i, colour) in data.colours.iter_mut().enumerate() {
            *colour = (i % 256) as u8;
        }
        data.data_loaded = data_types::ALL;
        data
    }

    fn sample() -> Land {
        let data = sample_data();
        Land {
            flags: land_flags::HEIGHTS_NORMALS | land_flags::TEXTURES,
            x: -3,
            y: 7,
            data_types: data_types::ALL,
            wnam: generate_wnam(&data.heights),
            land_data: Some(Box::new(data)),
            ..Land::default()
        }
    }

    fn open_land(bytes: Vec<u8>) -> (EsmReader<Cursor<Vec<u8>>>, Land) {
        let mut reader = EsmReader::new();
        reader.open(Cursor::new(bytes), "land").unwrap();
        assert_eq!(reader.get_rec_name().unwrap(), b"FAKE");
        reader.get_rec_header().unwrap();
        let mut land = Land::default();
        assert!(!land.load(&mut reader).unwrap());
        (reader, land)
    }

    #[test]
    fn texture_transpose_is_an_involution() {
        let input: [u16; LAND_NUM_TEXTURES] = std::array::from_fn(|i| i as u16);
        let once = transpose_textures(&input);
        assert_ne!(once, input);
        assert_eq!(transpose_textures(&once), input);
    }

    #[test]
    fn wnam_samples_and_clamps() {
        let mut heights = [0.0f32; LAND_NUM_VERTS];
        heights[0] = 128.0 * 10.0;
        heights[7] = -16.0 * 300.0;
        let wnam = generate_wnam(&heights);
        assert_eq!(wnam[0], 10);
        assert_eq!(wnam[1], i8::MIN);
        assert_eq!(wnam[GLOBAL_MAP_LOD_SIZE - 1], 0);
    }

    #[test]
    fn load_defers_bulk_data() {
        let record = sample();
        let bytes = save_fake(CURRENT_SAVE_GAME_FORMAT_VERSION, |w| record.save(w, false));
        let (mut reader, mut land) = open_land(bytes);

        assert_eq!((land.x, land.y, land.flags), (record.x, record.y, record.flags));
        assert_eq!(land.data_types, data_types::ALL);
        assert_eq!(land.wnam, record.wnam);
        assert!(land.land_data.is_none());
        assert!(!land.is_data_loaded(data_types::VHGT));

        land.load_data(data_types::ALL, &mut reader).unwrap();
        let data = land.land_data.as_deref().unwrap();
        let expected = record.land_data.as_deref().unwrap();
        assert_eq!(data.heights, expected.heights);
        assert_eq!(data.min_height.to_bits(), expected.min_height.to_bits());
        assert_eq!(data.max_height.to_bits(), expected.max_height.to_bits());
        assert_eq!(data.normals, expected.normals);
        assert_eq!(data.textures, expected.textures);
        assert_eq!(data.colours, expected.colours);
        assert_eq!(data.data_loaded, expected.data_loaded);
    }

    #[test]
    fn wnam_counts_as_loaded_only_when_requested() {
        let record = sample();
        let bytes = save_fake(CURRENT_SAVE_GAME_FORMAT_VERSION, |w| record.save(w, false));
        let (mut reader, mut land) = open_land(bytes);

        land.load_data(data_types::VHGT, &mut reader).unwrap();
        assert!(!land.is_data_loaded(data_types::WNAM));

        land.load_data(data_types::WNAM, &mut reader).unwrap();
        assert!(land.is_data_loaded(data_types::VHGT | data_types::WNAM));
        assert_eq!(
            land.land_data.as_deref().unwrap().data_loaded,
            data_types::VHGT | data_types::WNAM
        );
    }

    #[test]
    fn load_data_keeps_reader_position() {
        let record = sample();
        let mut writer = EsmWriter::new();
        writer.set_format_version(CURRENT_SAVE_GAME_FORMAT_VERSION);
        writer.save(Cursor::new(Vec::new())).unwrap();
        record.write_record(&mut writer, false).unwrap();
        writer.start_record(b"NEXT", 0).unwrap();
        writer.write_hnt(b"DATA", &7u32).unwrap();
        writer.end_record(b"NEXT").unwrap();
        let bytes = writer.close().unwrap().into_inner();

        let mut reader = EsmReader::new();
        reader.open(Cursor::new(bytes), "land").unwrap();
        assert_eq!(reader.get_rec_name().unwrap(), REC_LAND);
        let (mut land, _) = Land::load_record(&mut reader).unwrap();
        let before = reader.get_context();

        land.load_data(data_types::ALL, &mut reader).unwrap();
        assert!(land.is_data_loaded(data_types::ALL));
        assert_eq!(reader.get_context(), before);
        assert_eq!(reader.get_rec_name().unwrap(), b"NEXT");
        reader.get_rec_header().unwrap();
        assert_eq!(reader.get_hnt::<u32>(b"DATA").unwrap(), 7);
    }

    #[test]
    fn partial_load_then_rest() {
        let record = sample();
        let bytes = save_fake(CURRENT_SAVE_GAME_FORMAT_VERSION, |w| record.save(w, false));
        let (mut reader, mut land) = open_land(bytes);

        land.load_data(data_types::VHGT, &mut reader).unwrap();
        assert!(land.is_data_loaded(data_types::VHGT));
        assert!(!land.is_data_loaded(data_types::VCLR));

        land.load_data(data_types::VCLR | data_types::VTEX, &mut reader).unwrap();
        assert!(land.is_data_loaded(data_types::VHGT | data_types::VCLR | data_types::VTEX));
        assert!(!land.is_data_loaded(data_types::VNML));

        land.unload_data();
        assert!(land.land_data(data_types::VHGT).is_none());
    }

    #[test]
    fn blank_land_needs_no_reader() {
        let mut land = Land::default();
        land.blank();
        assert!(land.is_data_loaded(data_types::ALL));
        let data = land.land_data(data_types::VNML).unwrap();
        assert_eq!(&data.normals[..3], &[0, 0, 127]);
        assert_eq!(data.colours[0], 255);
    }

    #[test]
    fn deleted_land_has_no_data() {
        let record = sample();
        let bytes = save_fake(CURRENT_SAVE_GAME_FORMAT_VERSION, |w| record.save(w, true));
        let (land, deleted) = load_fake(bytes, |r| {
            let mut land = Land::default();
            let deleted = land.load(r)?;
            Ok((land, deleted))
        });
        assert!(deleted);
        assert_eq!(land.data_types, 0);
    }

    #[test]
    fn missing_location_is_error() {
        let bytes = save_fake(CURRENT_SAVE_GAME_FORMAT_VERSION, |w| w.write_hnt(b"DATA", &0i32));
        let err = crate::test_util::try_load_fake(bytes, |r| Land::default().load(r)).unwrap_err();
        assert!(matches!(err, EsmError::MissingSubRecord { name, .. } if name == b"INTV"));
    }
}
