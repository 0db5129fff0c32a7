use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "outlet-forge")]
#[command(about = "コンセント写真から交換用3Dプリントモデルを作成するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// サービスに接続せず代替値で動かす
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像の取り込みからモデル保存まで一括実行
    Run {
        /// コンセントの写真（png/jpg/jpeg/gif/bmp）
        #[arg(required = true, num_args = 1..)]
        images: Vec<PathBuf>,

        /// 色 (white/black/gray/beige/ivory)
        #[arg(short, long, default_value = "white")]
        color: String,

        /// 口数 (single/double/triple/quad)
        #[arg(short, long, default_value = "single")]
        arrangement: String,

        /// 壁厚 (mm, 1.0-5.0)
        #[arg(long, default_value = "2.0")]
        wall_thickness: f64,

        /// 奥行き (mm, 10-50)
        #[arg(long, default_value = "20")]
        depth: f64,

        /// メモ
        #[arg(long, default_value = "")]
        notes: String,

        /// 保存先フォルダ（省略時は設定値またはカレント）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// カスタマイズ内容を対話で入力
        #[arg(short, long)]
        interactive: bool,
    },

    /// 画像を分類して結果を表示
    Classify {
        /// コンセントの写真
        #[arg(required = true, num_args = 1..)]
        images: Vec<PathBuf>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// サービスの疎通確認
    Health,

    /// 対応規格を一覧表示
    Types,

    /// 設定を表示/編集
    Config {
        /// APIベースURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
