pub mod stage1_reference;
pub mod stage2_sample;
pub mod stage3_score;
pub mod stage4_display;
pub mod stage5_top_genes;
pub mod stage6_report;
