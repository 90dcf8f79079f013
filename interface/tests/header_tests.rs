//! Header generation, parsing and verification across both shader families.
//!
//! Every test runs against the `v450` and `v450/gltf` tables. The
//! hand-written headers serve as the reference the generated text must agree
//! with.

mod common;

use rstest::rstest;

use common::{init_logging, Variant, PBR_EXTERNALS, PBR_HEADER};
use prism_interface::{
    verify_header, HeaderConfig, HeaderDocument, HeaderWriter, InterfaceError, ShaderInterface,
};

// ============================================================================
// Round trips
// ============================================================================

#[rstest]
#[case::base(Variant::Base)]
#[case::pbr(Variant::Pbr)]
fn test_generated_header_parses_back(#[case] variant: Variant) {
    init_logging();
    let iface = variant.interface();
    let text = HeaderWriter::new(&iface).write();

    let doc = HeaderDocument::parse(&text).unwrap();
    assert!(doc.ignored.is_empty());
    let parsed = doc.to_interface(&iface.name, &iface.directory, &[]).unwrap();
    assert_eq!(parsed, iface);
    parsed.validate().unwrap();
}

#[rstest]
#[case::base(Variant::Base)]
#[case::pbr(Variant::Pbr)]
fn test_guarded_header_parses_back(#[case] variant: Variant) {
    let iface = variant.interface();
    let config = HeaderConfig::default().with_version(450).with_guard(true);
    let text = HeaderWriter::new(&iface).with_config(config).write();

    let parsed = HeaderDocument::parse(&text)
        .unwrap()
        .to_interface(&iface.name, &iface.directory, &[])
        .unwrap();
    assert_eq!(parsed, iface);
}

#[rstest]
#[case::base(Variant::Base)]
#[case::pbr(Variant::Pbr)]
fn test_generated_header_verifies(#[case] variant: Variant) {
    let iface = variant.interface();
    let text = HeaderWriter::new(&iface).write();
    verify_header(&text, &iface, &[]).unwrap();
}

// ============================================================================
// Hand-written headers
// ============================================================================

#[rstest]
#[case::base(Variant::Base)]
#[case::pbr(Variant::Pbr)]
fn test_hand_written_header_verifies(#[case] variant: Variant) {
    init_logging();
    verify_header(
        variant.hand_written_header(),
        &variant.interface(),
        variant.externals(),
    )
    .unwrap();
}

#[rstest]
#[case::base(Variant::Base)]
#[case::pbr(Variant::Pbr)]
fn test_hand_written_header_locations_match_table(#[case] variant: Variant) {
    let iface = variant.interface();
    let parsed = HeaderDocument::parse(variant.hand_written_header())
        .unwrap()
        .to_interface(&iface.name, &iface.directory, variant.externals())
        .unwrap();

    assert_eq!(parsed.location_map(), iface.location_map());
    for sampler in &iface.samplers {
        assert_eq!(parsed.binding_of(&sampler.name), Some(sampler.binding));
    }
    for block in &iface.uniform_blocks {
        let parsed_block = parsed.uniform_block(&block.name).unwrap();
        assert_eq!(parsed_block.binding, block.binding);
        assert_eq!(parsed_block.members, block.members);
        assert_eq!(parsed_block.layout, block.layout);
    }
}

#[test]
fn test_hand_written_base_header_is_the_base_table() {
    let iface = ShaderInterface::base();
    let parsed = HeaderDocument::parse(Variant::Base.hand_written_header())
        .unwrap()
        .to_interface(&iface.name, &iface.directory, &[])
        .unwrap();
    assert_eq!(parsed, iface);
}

#[test]
fn test_hand_written_pbr_offset_chain() {
    let table = HeaderDocument::parse(PBR_HEADER)
        .unwrap()
        .define_table()
        .with_external("LIGHT_LOCATIONS", 3)
        .with_external("MATERIAL_LOCATIONS", 7);

    let light = table.evaluate("LIGHT_LOCATION").unwrap();
    let material = table.evaluate("MATERIAL_LOCATION").unwrap();
    let tangent = table.evaluate("TANGENTLIGHT_LOCATION").unwrap();
    let last = table.evaluate("LAST_LOCATION_IN").unwrap();

    assert_eq!(material, light + 3);
    assert_eq!(tangent, material + 7);
    assert_eq!(last, tangent + 3);
    assert_eq!(table.evaluate("FRAGCOLOR_LOCATION_OUT").unwrap(), last);
    assert_eq!(
        table.dependencies("MATERIAL_LOCATION").unwrap(),
        vec!["LIGHT_LOCATION", "LIGHT_LOCATIONS"]
    );
}

#[test]
fn test_hand_written_pbr_header_needs_externals() {
    let doc = HeaderDocument::parse(PBR_HEADER).unwrap();
    assert_eq!(
        doc.define_table().evaluate("MATERIAL_LOCATION"),
        Err(InterfaceError::UnknownSymbol("LIGHT_LOCATIONS".to_string()))
    );

    let iface = doc.to_interface("pbr", "v450/gltf", PBR_EXTERNALS).unwrap();
    assert_eq!(iface.define_value("TANGENTLIGHT_LOCATION").unwrap(), 24);
}

// ============================================================================
// Mismatches
// ============================================================================

#[rstest]
#[case::base(Variant::Base, "#define TEXCOORD0_LOCATION_OUT 4", "#define TEXCOORD0_LOCATION_OUT 9")]
#[case::pbr(Variant::Pbr, "#define LIGHT_LOCATION 14", "#define LIGHT_LOCATION 15")]
fn test_edited_hand_written_header_is_rejected(
    #[case] variant: Variant,
    #[case] from: &str,
    #[case] to: &str,
) {
    let text = variant.hand_written_header().replace(from, to);
    assert_ne!(text, variant.hand_written_header());
    let err = verify_header(&text, &variant.interface(), variant.externals()).unwrap_err();
    assert!(
        matches!(err, InterfaceError::SymbolMismatch { .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn test_pbr_header_against_base_table_is_rejected() {
    let err = verify_header(PBR_HEADER, &ShaderInterface::base(), PBR_EXTERNALS).unwrap_err();
    assert_eq!(
        err,
        InterfaceError::UnknownSymbol("DIFFUSECOLOR_LOCATION".to_string())
    );
}
