use treesig::TreeShape;

pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1 << 10;

    if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

pub fn shape_label(shape: TreeShape) -> String {
    format!(
        "d{}_w{}_{}",
        shape.depth(),
        shape.width(),
        format_size(shape.signature_bytes()).replace(' ', "")
    )
}

/// Budgets benchmarked by the tree benches.
pub const BUDGETS: [usize; 3] = [4000, 8 * 1024, 16 * 1024];
