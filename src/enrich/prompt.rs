// src/enrich/prompt.rs
//! Prompt contract for the article analysis call.

pub const CATEGORIES: [&str; 6] = [
    "研究",
    "制度・政策",
    "支援・療育",
    "学校教育",
    "当事者の声",
    "テクノロジー",
];

pub const RELIABILITY_TIERS: [&str; 3] = ["★★★", "★★", "★"];

pub const COUNTRY_HINTS: &str = "US / UK / AU / JP / EU / CA / 国際";

/// Build the full prompt for one article. The model is told to answer with a
/// single JSON object using the keys `titleJa`, `bullets`, `country`,
/// `category`, `reliability`, `parentMeaning`, `todayAction`.
pub fn build_prompt(title: &str, snippet: &str, source: &str) -> String {
    let categories = CATEGORIES.join(" / ");
    let tiers = RELIABILITY_TIERS.join(" / ");
    format!(
        r#"あなたはASD（自閉スペクトラム症）の専門ジャーナリスト兼、特別支援教育の専門家です。
以下のニュース記事を分析し、日本人の保護者（特にASDの小学生を持つ親）向けに情報を整理してください。

【最重要ミッション】
難しい研究や海外の専門的なニュースであっても、「ASDの子どもや、小学生を持つ親の日常・教育・子育てにどう役立つか」という視点を最優先に抽出・意訳してください。専門用語は極力避け、温かく希望を持てる表現を使用してください。

【出力フォーマット（JSON形式で厳守）】
以下のJSON形式で出力してください。JSONのみを出力し、他のテキストは一切含めないでください。

{{
  "titleJa": "25文字以内の日本語タイトル",
  "bullets": [
    "要約1行目（必ず「。」で終わる完結した文）",
    "要約2行目（必ず「。」で終わる完結した文）",
    "要約3行目（必ず「。」で終わる完結した文）"
  ],
  "country": "記事の発信国コード（{COUNTRY_HINTS} など）",
  "category": "以下から1つ選択: {categories}",
  "reliability": "情報源の信頼度を以下から選択: {tiers}",
  "parentMeaning": "この記事が保護者にとってどんな意味があるか（40文字以内、具体的に）",
  "todayAction": "この記事を読んだ保護者が今日できる具体的なアクション1つ（40文字以内）"
}}

【信頼度の基準】
- ★★★：政府機関（CDC, NIH等）、学会誌、大学の査読付き研究
- ★★：専門メディア（ScienceDaily, Spectrum等）、専門団体
- ★：個人ブログ、体験談、SNS情報

【記事情報】
ソース: {source}
タイトル: {title}
内容: {snippet}

【注意事項】
- 必ず有効なJSON形式で出力すること
- 保護者の不安を煽らず、前向きで実用的な内容にすること
- 「今日の1アクション」は具体的で実行可能なものにすること
- ※重要：もし「内容」が極端に短かったり、「タイトル」と同じであった場合でも、決してエラーにはせず、タイトルから推測して必ず全ての項目を日本語で埋めたJSONを生成してください。"#
    )
}
