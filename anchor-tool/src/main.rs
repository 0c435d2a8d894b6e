use anchor_gen::{AnchorGenerator, AnchorPyramid, GridShape, PixelShape};
use anyhow::{Context, Result};
use bbox::prelude::*;
use clap::Parser;
use log::info;
use prettytable::{cell, row, Table};
use std::{
    env,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Parser)]
/// Inspect anchors produced by an anchor configuration
enum Opts {
    /// Print the basis anchors
    Basis {
        /// anchor configuration file
        config_file: PathBuf,
    },
    /// Print anchors tiled on a feature map
    Grid {
        /// anchor configuration file
        config_file: PathBuf,
        #[clap(long)]
        rows: usize,
        #[clap(long)]
        cols: usize,
        #[clap(long, default_value = "16")]
        stride: f64,
        /// rows holding real image content, defaults to all rows
        #[clap(long)]
        valid_rows: Option<usize>,
        /// columns holding real image content, defaults to all columns
        #[clap(long)]
        valid_cols: Option<usize>,
    },
    /// Summarize the levels of a pyramid for an input image
    Pyramid {
        /// pyramid configuration file
        config_file: PathBuf,
        /// padded input height in pixels
        #[clap(long)]
        height: usize,
        /// padded input width in pixels
        #[clap(long)]
        width: usize,
        /// image height before padding, defaults to the padded height
        #[clap(long)]
        image_height: Option<usize>,
        /// image width before padding, defaults to the padded width
        #[clap(long)]
        image_width: Option<usize>,
    },
}

fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Basis { config_file } => {
            basis(config_file)?;
        }
        Opts::Grid {
            config_file,
            rows,
            cols,
            stride,
            valid_rows,
            valid_cols,
        } => {
            let feature_size = GridShape::new(rows, cols);
            let valid_size = GridShape::new(valid_rows.unwrap_or(rows), valid_cols.unwrap_or(cols));
            grid(config_file, feature_size, valid_size, stride)?;
        }
        Opts::Pyramid {
            config_file,
            height,
            width,
            image_height,
            image_width,
        } => {
            let pad_shape = PixelShape::new(height, width);
            let image_shape =
                PixelShape::new(image_height.unwrap_or(height), image_width.unwrap_or(width));
            pyramid(config_file, pad_shape, image_shape)?;
        }
    }

    Ok(())
}

fn open_generator(config_file: &Path) -> Result<AnchorGenerator> {
    AnchorGenerator::open(config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))
}

fn basis(config_file: impl AsRef<Path>) -> Result<()> {
    let generator = open_generator(config_file.as_ref())?;
    let [x_ctr, y_ctr] = generator.basis().center();
    info!(
        "{} basis anchors centered at ({}, {})",
        generator.num_base_anchors(),
        x_ctr,
        y_ctr
    );

    let mut table = Table::new();
    table.add_row(row!["index", "x_min", "y_min", "x_max", "y_max", "w", "h"]);

    generator
        .base_anchors()
        .iter()
        .enumerate()
        .for_each(|(index, rect)| {
            table.add_row(row![
                index,
                rect.x_min(),
                rect.y_min(),
                rect.x_max(),
                rect.y_max(),
                rect.w(),
                rect.h()
            ]);
        });

    table.printstd();
    Ok(())
}

fn grid(
    config_file: impl AsRef<Path>,
    feature_size: GridShape,
    valid_size: GridShape,
    stride: f64,
) -> Result<()> {
    let generator = open_generator(config_file.as_ref())?;
    let anchors = generator.grid_anchors(feature_size, stride)?;
    let flags = generator.valid_flags(feature_size, valid_size)?;
    info!(
        "{} anchors on {} feature map, {} valid",
        anchors.len(),
        feature_size,
        flags.num_valid()
    );

    let mut table = Table::new();
    table.add_row(row![
        "index", "row", "col", "anchor", "x_min", "y_min", "x_max", "y_max", "valid"
    ]);

    let layout = anchors.layout();
    anchors
        .iter()
        .zip(flags.flags().iter())
        .zip(layout.positions())
        .enumerate()
        .for_each(|(index, ((rect, valid), (cell_row, cell_col, anchor)))| {
            table.add_row(row![
                index,
                cell_row,
                cell_col,
                anchor,
                rect.x_min(),
                rect.y_min(),
                rect.x_max(),
                rect.y_max(),
                valid
            ]);
        });

    table.printstd();
    Ok(())
}

fn pyramid(
    config_file: impl AsRef<Path>,
    pad_shape: PixelShape,
    image_shape: PixelShape,
) -> Result<()> {
    let config_file = config_file.as_ref();
    let pyramid = AnchorPyramid::open(config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))?;

    let feature_sizes: Vec<_> = pyramid
        .strides()
        .into_iter()
        .map(|stride| {
            let cover = |pixels: usize| (pixels as f64 / stride).ceil() as usize;
            GridShape::new(cover(pad_shape.h), cover(pad_shape.w))
        })
        .collect();
    let anchors = pyramid.anchors(&feature_sizes)?;
    let flags = pyramid.valid_flags(&feature_sizes, image_shape)?;
    let ranges = pyramid.flat_ranges(&feature_sizes)?;

    let mut table = Table::new();
    table.add_row(row![
        "level", "stride", "feature size", "valid size", "base anchors", "anchors", "valid", "range"
    ]);

    pyramid
        .strides()
        .into_iter()
        .zip(anchors.iter().zip(&flags))
        .zip(ranges)
        .enumerate()
        .for_each(|(level, ((stride, (anchors, flags)), range))| {
            table.add_row(row![
                level,
                stride,
                anchors.feature_size(),
                flags.valid_size(),
                anchors.num_base_anchors(),
                anchors.len(),
                flags.num_valid(),
                format!("{:?}", range)
            ]);
        });

    table.printstd();
    Ok(())
}
