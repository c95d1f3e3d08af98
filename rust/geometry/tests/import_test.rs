// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end imports of small STEP solids.

use std::path::PathBuf;

use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};
use stp_lite_core::DiagnosticKind;
use stp_lite_geometry::{Error, MeshPayload, StepImporter, UNKNOWN_OBJECT};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn load(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).expect("fixture should be readable")
}

fn point(object: &MeshPayload, index: u32) -> Point3<f64> {
    Point3::from(object.vertices[index as usize])
}

/// Newell normal of a polygon
fn polygon_normal(object: &MeshPayload, face: &[u32]) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    for (i, &a) in face.iter().enumerate() {
        let p = point(object, a);
        let q = point(object, face[(i + 1) % face.len()]);
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }
    normal
}

/// Quads follow their loops, so every face points out of the cube
fn assert_cube_faces_outward(cube: &MeshPayload) {
    let center = Point3::new(5.0, 5.0, 5.0);
    for face in &cube.faces {
        let normal = polygon_normal(cube, face);
        let centroid = face
            .iter()
            .fold(Vector3::zeros(), |acc, &i| acc + point(cube, i).coords)
            / face.len() as f64;
        assert_relative_eq!(normal.norm(), 200.0, epsilon = 1e-9);
        assert!(
            normal.dot(&(centroid - center.coords)) > 0.0,
            "face {:?} points into the cube",
            face
        );
    }
}

#[test]
fn test_cube_import() {
    let report = StepImporter::new().import_file(fixture("cube.stp")).unwrap();

    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert_eq!(report.objects.len(), 1);

    let cube = &report.objects[0];
    assert_eq!(cube.object_name, "Cube");
    assert_eq!(cube.vertex_count(), 8);
    assert_eq!(cube.edge_count(), 12);
    assert_eq!(cube.face_count(), 6);

    for face in &cube.faces {
        assert_eq!(face.len(), 4);
        assert!(face.iter().all(|&i| i < 8));
    }
    assert_cube_faces_outward(cube);

    for edge in &cube.edges {
        let length = (point(cube, edge[1]) - point(cube, edge[0])).norm();
        assert_relative_eq!(length, 10.0, epsilon = 1e-9);
    }
}

#[test]
fn test_opposite_sense_plane_keeps_loop_winding() {
    // Bottom plane normal points into the solid; the face flags it with .F.
    let content = load("cube.stp")
        .replace("#37=DIRECTION('',(0.,0.,-1.));", "#37=DIRECTION('',(0.,0.,1.));")
        .replace(
            "#210=ADVANCED_FACE('',(#209),#40,.T.);",
            "#210=ADVANCED_FACE('',(#209),#40,.F.);",
        );
    let report = StepImporter::new().import_str(&content).unwrap();

    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    let cube = &report.objects[0];
    assert_eq!(cube.face_count(), 6);
    assert_cube_faces_outward(cube);
}

#[test]
fn test_broken_loop_skips_only_that_face() {
    let content = load("cube.stp").replace(
        "#208=EDGE_LOOP('',(#204,#205,#206,#207));",
        "#208=EDGE_LOOP('',(#204,#205,#206));",
    );
    let report = StepImporter::new().import_str(&content).unwrap();

    assert_eq!(report.diagnostics.count(DiagnosticKind::LoopIntegrity), 1);
    let diagnostic = report.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.entity, Some(210));

    let cube = &report.objects[0];
    assert_eq!(cube.face_count(), 5);
    assert_eq!(cube.vertex_count(), 8);
    assert_eq!(cube.edge_count(), 12);
}

#[test]
fn test_unknown_surface_type_is_reported() {
    let content = load("cube.stp").replace("#40=PLANE('',#39);", "#40=B_SPLINE_SURFACE('',#39);");
    let report = StepImporter::new().import_str(&content).unwrap();

    assert!(report.diagnostics.count(DiagnosticKind::SchemaMismatch) > 0);
    assert!(report.diagnostics.for_entity(210).next().is_some());
    assert_eq!(report.objects[0].face_count(), 5);
}

#[test]
fn test_unreferenced_shape_is_unknown_object() {
    let content: String = load("cube.stp")
        .lines()
        .filter(|line| !line.contains("SHAPE_DEFINITION_REPRESENTATION"))
        .map(|line| format!("{}\n", line))
        .collect();
    let report = StepImporter::new().import_str(&content).unwrap();

    assert_eq!(report.objects.len(), 1);
    assert_eq!(report.objects[0].object_name, UNKNOWN_OBJECT);
    assert_eq!(report.objects[0].face_count(), 6);
}

#[test]
fn test_cylinder_import_through_relationship() {
    let report = StepImporter::new().import_file(fixture("cylinder.stp")).unwrap();

    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert_eq!(report.objects.len(), 1);

    let cylinder = &report.objects[0];
    // PRODUCT has an empty name, so the id is used
    assert_eq!(cylinder.object_name, "CYL-1");

    // Two shared vertices, the revolved seam and two 32-gon caps
    assert_eq!(cylinder.vertex_count(), 2 + 64 + 32 + 32);
    assert_eq!(cylinder.face_count(), 32 + 2);
    // Only the seam is a straight edge
    assert_eq!(cylinder.edge_count(), 1);

    let quads = cylinder.faces.iter().filter(|f| f.len() == 4).count();
    let caps = cylinder.faces.iter().filter(|f| f.len() == 32).count();
    assert_eq!((quads, caps), (32, 2));

    for v in &cylinder.vertices[2..66] {
        assert_relative_eq!((v[0] * v[0] + v[1] * v[1]).sqrt(), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_seam_from_neighbouring_face_drives_cylinder() {
    // The side face is bounded by its two circles only; the seam line sits in
    // the fin's loop and reaches the cylinder through its PCURVEs.
    let report = StepImporter::new().import_file(fixture("seam_fin.stp")).unwrap();

    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert_eq!(report.objects.len(), 1);

    let part = &report.objects[0];
    // Category is "detail", which is reported but still imported
    assert_eq!(part.object_name, "Finned Pin");
    // Four fin vertices, the revolved seam and two 32-gon caps
    assert_eq!(part.vertex_count(), 4 + 64 + 32 + 32);
    assert_eq!(part.face_count(), 1 + 32 + 2);
    assert_eq!(part.edge_count(), 4);
    assert_eq!(part.faces[0], vec![0, 1, 2, 3]);

    // Seam copies, not a bridge between the two circles
    let seam_start = point(part, 4);
    let seam_end = point(part, 5);
    assert_relative_eq!(seam_start, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-9);
    assert_relative_eq!(seam_end, Point3::new(1.0, 0.0, 2.0), epsilon = 1e-9);
    assert_eq!(part.faces[1], vec![4, 5, 7, 6]);

    let quads = part.faces.iter().filter(|f| f.len() == 4).count();
    assert_eq!(quads, 1 + 32);
    for v in &part.vertices[4..68] {
        assert_relative_eq!((v[0] * v[0] + v[1] * v[1]).sqrt(), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_importer_is_reusable() {
    let importer = StepImporter::new();
    let cube = importer.import_str(&load("cube.stp")).unwrap();
    let cylinder = importer.import_str(&load("cylinder.stp")).unwrap();
    let again = importer.import_str(&load("cube.stp")).unwrap();

    assert_eq!(cube.objects, again.objects);
    assert_eq!(cylinder.objects[0].object_name, "CYL-1");
}

#[test]
fn test_missing_header_is_fatal() {
    let content = "ISO-10303-21;\nDATA;\n#1=CARTESIAN_POINT('',(0.,0.,0.));\nENDSEC;\nEND-ISO-10303-21;\n";
    let err = StepImporter::new().import_str(content).unwrap_err();
    assert!(matches!(err, Error::Core(_)));
}

#[test]
fn test_missing_file_is_an_error() {
    let err = StepImporter::new()
        .import_file(fixture("does-not-exist.stp"))
        .unwrap_err();
    assert!(matches!(err, Error::Core(stp_lite_core::Error::Io(_))));
}
