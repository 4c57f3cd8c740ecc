//! Tests for pattern extraction with symmetry variants and output reconstruction

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};
    use wavesynth::SynthesisError;
    use wavesynth::spatial::tiles::{PatternCatalog, reflect, rotate_90, symmetry_variants};

    fn checkerboard(size: usize) -> Array2<usize> {
        Array2::from_shape_fn((size, size), |(row, col)| (row + col) % 2)
    }

    fn numbered(rows: usize, cols: usize) -> Array2<usize> {
        Array2::from_shape_fn((rows, cols), |(row, col)| row * cols + col)
    }

    // Tests that a toroidal checkerboard yields its two phases with equal weight
    // Verified by dropping the wrap-around modulo in window extraction
    #[test]
    fn test_periodic_checkerboard_catalog() {
        let catalog = PatternCatalog::extract(&checkerboard(4), 2, 1, true).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.pattern(0), Some(&array![[0, 1], [1, 0]]));
        assert_eq!(catalog.pattern(1), Some(&array![[1, 0], [0, 1]]));
        assert_eq!(catalog.weights(), &[8.0, 8.0]);
        assert!((catalog.total_weight() - 16.0).abs() < f64::EPSILON);
    }

    // Tests that clamped extraction only uses windows that fit inside the sample
    // Verified by anchoring windows at every cell regardless of the flag
    #[test]
    fn test_clamped_window_count() {
        let catalog = PatternCatalog::extract(&checkerboard(4), 2, 1, false).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.weights(), &[5.0, 4.0]);
    }

    // Tests that windows read across the sample edges when the input is periodic
    // Verified by clamping rows instead of wrapping them
    #[test]
    fn test_periodic_windows_wrap() {
        let catalog = PatternCatalog::extract(&numbered(3, 3), 2, 1, true).unwrap();

        assert_eq!(catalog.len(), 9);
        assert!(catalog.id_of(&array![[8, 6], [2, 0]]).is_some());
        assert_eq!(catalog.pattern_size(), 2);
    }

    // Tests that each symmetry variant adds distinct patterns and weight
    // Verified by truncating variants to the identity only
    #[test]
    fn test_symmetry_multiplies_patterns() {
        let sample = numbered(5, 5);
        let plain = PatternCatalog::extract(&sample, 2, 1, false).unwrap();
        let full = PatternCatalog::extract(&sample, 2, 8, false).unwrap();

        assert_eq!(plain.len(), 16);
        assert_eq!(full.len(), 128);
        assert!((full.total_weight() - 128.0).abs() < f64::EPSILON);
    }

    // Tests the fixed order of the dihedral variants
    // Verified by swapping reflection and rotation order
    #[test]
    fn test_symmetry_variant_order() {
        let base = array![[1, 2], [3, 4]];
        let variants = symmetry_variants(base.clone(), 8);

        assert_eq!(variants.len(), 8);
        assert_eq!(variants.first(), Some(&base));
        assert_eq!(variants.get(1), Some(&array![[2, 1], [4, 3]]));
        assert_eq!(variants.get(2), Some(&array![[3, 1], [4, 2]]));
        assert_eq!(variants.get(3), Some(&reflect(&rotate_90(&base))));
        assert_eq!(symmetry_variants(base, 3).len(), 3);
    }

    // Tests that four quarter turns and two reflections are identities
    // Verified by rotating counter-clockwise in one call
    #[test]
    fn test_transform_identities() {
        let base = array![[1, 2, 3], [4, 5, 6], [7, 8, 9]];
        let turned = rotate_90(&rotate_90(&rotate_90(&rotate_90(&base))));
        assert_eq!(turned, base);
        assert_eq!(reflect(&reflect(&base)), base);
        assert_eq!(rotate_90(&base), array![[7, 4, 1], [8, 5, 2], [9, 6, 3]]);
    }

    // Tests clockwise rotation and mirroring on a non-square matrix
    // Verified by inverting the row axis instead of the column axis
    #[test]
    fn test_transform_orientation() {
        let wide = array![[1, 2, 3], [4, 5, 6]];

        assert_eq!(rotate_90(&wide), array![[4, 1], [5, 2], [6, 3]]);
        assert_eq!(reflect(&wide), array![[3, 2, 1], [6, 5, 4]]);
        assert_eq!(
            rotate_90(&rotate_90(&wide)),
            array![[6, 5, 4], [3, 2, 1]]
        );
    }

    // Tests configuration errors for pattern size, symmetry and empty samples
    // Verified by relaxing the pattern size check to strictly greater
    #[test]
    fn test_invalid_extraction_parameters() {
        let sample = checkerboard(4);
        let cases = [(4, 1), (5, 1), (0, 1), (2, 0), (2, 9)];
        for (pattern_size, symmetry) in cases {
            let result = PatternCatalog::extract(&sample, pattern_size, symmetry, true);
            assert!(
                matches!(result, Err(SynthesisError::InvalidConfig { .. })),
                "N={pattern_size}, S={symmetry} should be rejected"
            );
        }

        let empty: Array2<usize> = Array2::zeros((0, 3));
        assert!(PatternCatalog::extract(&empty, 1, 1, true).is_err());
    }

    // Tests that rendering a resolved wave reconstructs the checkerboard
    // Verified by reading every pixel from the last wave column
    #[test]
    fn test_render_non_periodic() {
        let catalog = PatternCatalog::extract(&checkerboard(4), 2, 1, true).unwrap();
        let wave = Array2::from_shape_fn((3, 3), |(row, col)| (row + col) % 2);

        let output = catalog.render(&wave, 4, 4, false).unwrap();
        assert_eq!(output, checkerboard(4));
    }

    // Tests that periodic rendering takes one pixel per cell
    // Verified by applying the trailing-margin rule in periodic mode
    #[test]
    fn test_render_periodic() {
        let catalog = PatternCatalog::extract(&checkerboard(4), 2, 1, true).unwrap();
        let wave = Array2::from_shape_fn((6, 6), |(row, col)| (row + col) % 2);

        let output = catalog.render(&wave, 6, 6, true).unwrap();
        assert_eq!(output, checkerboard(6));
    }

    // Tests that mismatched waves and unknown ids are rejected
    // Verified by removing the dimension check before rendering
    #[test]
    fn test_render_errors() {
        let catalog = PatternCatalog::extract(&checkerboard(4), 2, 1, true).unwrap();

        let wrong_size = Array2::zeros((4, 4));
        assert!(matches!(
            catalog.render(&wrong_size, 4, 4, false),
            Err(SynthesisError::InvalidConfig { .. })
        ));

        let unknown = Array2::from_elem((3, 3), 7);
        assert!(matches!(
            catalog.render(&unknown, 4, 4, false),
            Err(SynthesisError::InvalidSourceData { .. })
        ));
    }
}
