//! User-interface strings per language.
//!
//! Tables exist for `zh`, `en` and `ja`. Any other code gets English.

/// Every piece of fixed text the client renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiStrings {
    pub site_title: &'static str,
    pub search_placeholder: &'static str,
    pub search_no_results: &'static str,
    pub search_searching: &'static str,
    pub back_to_home: &'static str,
    pub table_of_contents: &'static str,
    pub loading_article: &'static str,
    pub load_failed: &'static str,
    pub index_load_error: &'static str,
    pub error_message: &'static str,
    pub dismiss: &'static str,
}

const ZH: UiStrings = UiStrings {
    site_title: "信息中心",
    search_placeholder: "搜索文档...",
    search_no_results: "没有找到相关结果",
    search_searching: "正在搜索...",
    back_to_home: "返回主页",
    table_of_contents: "文档目录",
    loading_article: "正在加载文档...",
    load_failed: "加载失败",
    index_load_error: "无法加载文档索引",
    error_message: "错误信息",
    dismiss: "关闭",
};

const EN: UiStrings = UiStrings {
    site_title: "Info Center",
    search_placeholder: "Search documents...",
    search_no_results: "No results found",
    search_searching: "Searching...",
    back_to_home: "Back to Home",
    table_of_contents: "Table of Contents",
    loading_article: "Loading document...",
    load_failed: "Load Failed",
    index_load_error: "Failed to load document index",
    error_message: "Error message",
    dismiss: "Dismiss",
};

const JA: UiStrings = UiStrings {
    site_title: "インフォメーションセンター",
    search_placeholder: "ドキュメントを検索...",
    search_no_results: "結果が見つかりません",
    search_searching: "検索中...",
    back_to_home: "ホームに戻る",
    table_of_contents: "目次",
    loading_article: "ドキュメントを読み込んでいます...",
    load_failed: "読み込みに失敗しました",
    index_load_error: "ドキュメントインデックスを読み込めません",
    error_message: "エラーメッセージ",
    dismiss: "閉じる",
};

impl UiStrings {
    pub fn for_language(code: &str) -> &'static UiStrings {
        match code {
            "zh" => &ZH,
            "ja" => &JA,
            _ => &EN,
        }
    }
}
