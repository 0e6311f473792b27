//! Prompt construction.
//!
//! A country-selected base template with `{placeholder}` substitution, plus
//! one modifier fragment each for platform, industry, tone, and goal. The
//! enums are closed, so the modifier tables are exhaustive and building a
//! prompt can never fail.

use crate::models::{ContentRequest, Country, Goal, Industry, Platform, Tone};

const BASE_ENGLISH: &str = r#"You are an expert content creator specializing in high-quality blog posts for global audiences.

Create an engaging, well-structured blog post about "{topic}" with the following specifications:

**Target Audience:** {country} readers
**Industry Focus:** {industry}
**Platform:** {platform}
**Tone:** {tone}
**Goal:** {goal}
**Language:** {language}
**Target Length:** Approximately {length} words
{keywords_block}
**Content Structure Requirements:**
1. Compelling headline that grabs attention
2. Engaging introduction with a hook
3. Well-organized main content with clear sections
4. Practical insights and actionable advice
5. Strong conclusion with call-to-action

**Quality Standards:**
- Write in a natural, human-like style
- Include specific examples and data when relevant
- Ensure content is valuable and not just filler
- Make it engaging and shareable
- Optimize for the target platform's audience preferences
{instructions_block}
Please provide:
1. A compelling title
2. The complete blog post content
3. Suggested tags (3-5 tags)
4. Brief engagement tips for this specific content"#;

const BASE_CHINESE: &str = r#"你是一位专业的内容创作专家，专门为全球受众创作高质量的博客文章。

请创作一篇关于"{topic}"的引人入胜、结构良好的博客文章，具体要求如下：

**目标受众：** {country} 读者
**行业重点：** {industry}
**平台：** {platform}
**语调：** {tone}
**目标：** {goal}
**语言：** {language}
**目标长度：** 大约 {length} 字
{keywords_block}
**内容结构要求：**
1. 吸引人的标题
2. 有钩子的引人入胜的开头
3. 组织良好的主要内容，分段清晰
4. 实用见解和可操作的建议
5. 有行动号召的强有力结论

**质量标准：**
- 用自然、人性化的风格写作
- 在相关时包含具体例子和数据
- 确保内容有价值，不只是填充
- 让内容引人入胜且易于分享
- 针对目标平台的受众偏好进行优化
{instructions_block}
请提供：
1. 一个引人注目的标题
2. 完整的博客文章内容
3. 建议的标签（3-5个标签）
4. 针对此特定内容的简要互动提示"#;

fn platform_modifier(platform: Platform) -> &'static str {
    match platform {
        Platform::Medium => {
            "Optimize for Medium's audience: Use subheadings, bullet points, and readable paragraphs. Include a compelling subtitle."
        }
        Platform::Zhihu => {
            "针对知乎优化：使用问答式开头，包含数据支持，添加个人经验分享，使用中文互联网用户熟悉的表达方式。"
        }
        Platform::Twitter => {
            "Optimize for Twitter/X: Keep sections short and punchy, front-load the key insight, and make every paragraph quotable on its own."
        }
        Platform::Xiaohongshu => {
            "针对小红书优化：风格轻松活泼，多用表情符号和短段落，突出个人体验和实用清单。"
        }
        Platform::Wechat => {
            "针对微信公众号优化：结构清晰，段落简短，开头点题，结尾引导读者点赞和转发。"
        }
        Platform::Linkedin => {
            "Optimize for LinkedIn: Frame insights around professional growth, include industry context, and invite peers to share their perspective."
        }
        Platform::Substack => {
            "Optimize for Substack: Write with a newsletter voice, address the reader directly, and close with a reason to subscribe."
        }
        Platform::Note => {
            "Optimize for Note: Keep the structure simple and personal, with a reflective, essay-like voice."
        }
        Platform::Blog => {
            "Optimize for a general blog: Use clear headings, scannable sections, and internal logic a search engine can follow."
        }
    }
}

fn industry_modifier(industry: Industry) -> &'static str {
    match industry {
        Industry::General => {
            "Keep content accessible to general audiences while maintaining depth and value."
        }
        Industry::Finance => {
            "Include relevant financial data, market trends, and practical investment advice. Cite credible financial sources."
        }
        Industry::Health => {
            "Ground claims in reputable health research, avoid medical overreach, and include practical wellness advice."
        }
        Industry::Education => {
            "Structure content for learners: define terms, build from fundamentals, and include concrete study or teaching takeaways."
        }
        Industry::Gaming => {
            "Speak the gaming community's language, reference relevant titles or mechanics, and keep the energy high."
        }
        Industry::Technology => {
            "Include concrete technical examples and current developments, keeping explanations accessible to non-specialists."
        }
        Industry::Lifestyle => {
            "Keep the voice personal and aspirational, with everyday examples readers can act on immediately."
        }
        Industry::Business => {
            "Focus on actionable business insights, real company examples, and measurable outcomes."
        }
        Industry::Travel => {
            "Include specific destinations, practical logistics, and sensory detail that helps readers picture the experience."
        }
        Industry::Food => {
            "Include specific dishes, ingredients, or techniques, with vivid descriptions that make the content appetizing."
        }
    }
}

fn tone_modifier(tone: Tone) -> &'static str {
    match tone {
        Tone::Professional => {
            "Maintain a professional, authoritative tone while remaining approachable and clear."
        }
        Tone::Casual => {
            "Use a conversational, friendly tone with personal anecdotes and relatable examples."
        }
        Tone::Entertaining => {
            "Keep the tone playful and witty, using humor and storytelling to hold attention."
        }
        Tone::Analytical => {
            "Use a precise, evidence-driven tone: compare options, weigh trade-offs, and support claims with data."
        }
        Tone::Inspirational => {
            "Use an uplifting, motivating tone that connects the topic to the reader's goals and potential."
        }
        Tone::Neutral => {
            "Keep the tone balanced and matter-of-fact, presenting information without editorializing."
        }
    }
}

fn goal_modifier(goal: Goal) -> &'static str {
    match goal {
        Goal::Engagement => {
            "Include thought-provoking questions, encourage comments, and add shareable quotes or insights."
        }
        Goal::Conversion => {
            "Build toward a clear call-to-action, emphasize concrete benefits, and reduce the reader's hesitation to act."
        }
        Goal::Shares => {
            "Make the content inherently shareable: surprising facts, quotable lines, and a takeaway worth passing on."
        }
        Goal::Comments => {
            "Invite discussion explicitly: pose open questions, present debatable viewpoints, and ask for reader experiences."
        }
        Goal::Followers => {
            "Showcase consistent expertise and voice, and give readers a reason to follow for future content."
        }
        Goal::Awareness => {
            "Prioritize clarity and memorability of the core message so readers retain and repeat it."
        }
    }
}

/// Renders the full prompt for a request. Pure; never fails.
pub fn build_prompt(request: &ContentRequest) -> String {
    let chinese = request.country == Country::CN;
    let base = if chinese { BASE_CHINESE } else { BASE_ENGLISH };

    let keywords_block = if request.keywords.is_empty() {
        String::new()
    } else if chinese {
        format!("\n**需要包含的关键词：** {}\n", request.keywords.join("、"))
    } else {
        format!(
            "\n**Keywords to Include:** {}\n",
            request.keywords.join(", ")
        )
    };

    let instructions_block = match request.custom_instructions.as_deref() {
        Some(instructions) if !instructions.trim().is_empty() => {
            if chinese {
                format!("\n**额外说明：** {instructions}\n")
            } else {
                format!("\n**Additional Instructions:** {instructions}\n")
            }
        }
        _ => String::new(),
    };

    let rendered = base
        .replace("{topic}", &request.topic)
        .replace("{country}", request.country.as_str())
        .replace("{industry}", request.industry.as_str())
        .replace("{platform}", request.platform.as_str())
        .replace("{tone}", request.tone.as_str())
        .replace("{goal}", request.goal.as_str())
        .replace("{language}", &request.language)
        .replace("{length}", &request.length.to_string())
        .replace("{keywords_block}", &keywords_block)
        .replace("{instructions_block}", &instructions_block);

    let modifiers = [
        platform_modifier(request.platform),
        industry_modifier(request.industry),
        tone_modifier(request.tone),
        goal_modifier(request.goal),
    ];

    let mut prompt = rendered;
    prompt.push_str("\n\nAdditional Requirements:\n");
    for modifier in modifiers {
        prompt.push_str("- ");
        prompt.push_str(modifier);
        prompt.push('\n');
    }
    // No trailing newline after the last modifier line
    prompt.truncate(prompt.trim_end_matches('\n').len());
    prompt
}
