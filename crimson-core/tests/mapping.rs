use crimson_core::{
    map, CoreError, Mapper, MapperOptions, ReferenceIndex, ScoreParams, SketchParams, Strand,
};

/// Deterministic pseudo-random DNA (xorshift64).
fn random_dna(len: usize, mut seed: u64) -> Vec<u8> {
    const BASES: [u8; 4] = *b"ACGT";
    (0..len)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            BASES[(seed >> 33) as usize & 3]
        })
        .collect()
}

fn genome() -> Vec<Vec<u8>> {
    vec![
        random_dna(4_000, 0x9E37_79B9_7F4A_7C15),
        random_dna(6_000, 0xD1B5_4A32_D192_ED03),
        random_dna(5_000, 0x8CB9_2BA7_2F3D_8DD7),
    ]
}

#[test]
fn test_fragment_maps_to_its_origin() {
    let references = genome();
    let params = SketchParams::new(15, 10).unwrap();
    let index = ReferenceIndex::from_references(&references, params).unwrap();

    let fragment = &references[1][2_500..3_300];
    let chain = map(&index, fragment).unwrap();
    assert_eq!(chain.reference_id(), Some(1));
    assert!(chain.len() > 20);
    assert!(chain.is_consistent());
    assert!(chain.anchors().iter().all(|a| a.diagonal() == 2_500));
}

#[test]
fn test_mapper_reports_region() {
    let references = genome();
    let params = SketchParams::new(15, 10).unwrap();
    let mapper = Mapper::build(references.clone(), params, 0.001, MapperOptions::default()).unwrap();

    let fragment = references[2][1_000..1_600].to_vec();
    let mapping = mapper.map_fragment(&fragment).unwrap().expect("fragment maps");
    assert_eq!(mapping.reference_id, 2);
    assert_eq!(mapping.strand, Strand::Forward);
    assert_eq!(mapping.query_len, 600);
    assert_eq!(mapping.reference_len, 5_000);
    assert_eq!(
        mapping.reference_begin - mapping.query_begin,
        1_000,
        "reference offset follows the fragment origin"
    );
    assert!(mapping.query_end as usize <= fragment.len());
    assert!(mapping.residue_matches <= mapping.block_length);
}

#[test]
fn test_mapper_aligns_with_substitution() {
    let references = genome();
    let params = SketchParams::new(15, 10).unwrap();
    let options = MapperOptions {
        align: true,
        score: ScoreParams::linear(3, -5, -4),
        ..MapperOptions::default()
    };
    let mapper = Mapper::build(references.clone(), params, 0.0, options).unwrap();

    let mut fragment = references[0][500..1_500].to_vec();
    fragment[500] = if fragment[500] == b'A' { b'C' } else { b'A' };

    let mapping = mapper.map_fragment(&fragment).unwrap().expect("fragment maps");
    assert_eq!(mapping.reference_id, 0);
    let cigar = mapping.cigar.as_ref().expect("alignment requested");
    let span = (mapping.query_end - mapping.query_begin) as usize;
    assert_eq!(cigar.to_string(), format!("{}M", span));
    assert_eq!(mapping.residue_matches, span);
    assert_eq!(mapping.block_length, span);
    assert_eq!(mapping.score, Some(3 * (span as i32 - 1) - 5));
}

#[test]
fn test_unrelated_fragment_is_unmapped() {
    let references = genome();
    let params = SketchParams::new(15, 10).unwrap();
    let mapper = Mapper::build(references, params, 0.0, MapperOptions::default()).unwrap();
    let fragment = random_dna(300, 0x1234_5678_9ABC_DEF1);
    assert!(mapper.map_fragment(&fragment).unwrap().is_none());
}

#[test]
fn test_index_lifecycle() {
    let references = genome();
    let mut index = ReferenceIndex::new();
    assert_eq!(map(&index, b"ACGT"), Err(CoreError::IndexNotBuilt));

    index.build(&references, SketchParams::new(12, 5).unwrap()).unwrap();
    let before = index.len();
    let removed = index.filter(0.01).unwrap();
    assert_eq!(index.len(), before - removed);

    index.reset();
    index.build(&references, SketchParams::new(15, 10).unwrap()).unwrap();
    assert_eq!(index.k(), Some(15));
    assert_eq!(index.reference_count(), 3);
}
