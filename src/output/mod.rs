pub mod formatter;

pub use formatter::{
    format_child_detail, format_children, format_disciplines, format_group_detail, format_groups,
    format_measurement, format_ranking, format_ranking_tsv, format_value, rank_icon,
    should_use_colors, DisplayOptions,
};
