// All LLM prompt constants for the copy generation flows.
// Reuses the copy-chief persona from llm_client::prompts.

// ────────────────────────────────────────────────────────────────────────────
// Worked examples
// ────────────────────────────────────────────────────────────────────────────

pub const EMAIL_EXAMPLE: &str = "\
### Example Email
**Subject Line:** Last chance to lock in $119 Motley Fool membership
**Greeting:** Hi Sarah,
**Body:** Tonight at midnight, your opportunity to save 60 % disappears. Thousands of Australians already rely on our ASX stock tips—now it's your turn. Click before the timer hits zero and start investing smarter.
**CTA:** Activate my membership
**Sign-off:** The Motley Fool Australia Team";

pub const SALES_PAGE_EXAMPLE: &str = "\
### Example Sales Page
## Headline
One Day Only—Unlock the Silver Pass for $119

### Introduction
Imagine having two extra experts on your side every month…

### Key Benefits
- Double the stock picks, triple the insight
- ASX, growth & dividend coverage in one pass
- 400,000+ Aussie investors already on board

### Detailed Body
Scroll down and you'll see why the Silver Pass could be your portfolio's inflection point. But remember—the $119 price tag vanishes at 11:59 pm tonight.

### CTA
**Yes! Secure My Pass Now**";

/// Bonus "reference winner" exemplars, unlocked by high-intensity traits.
pub const EMAIL_WINNER: &str = "\
### Reference Winner Email
**Subject Line:** Your $119 seat closes at midnight
**Greeting:** Hi Sarah,
**Body:** 125,000 Australians opened this offer last week. Most of them acted. The ones who didn't are still asking what they missed. Lock in 60 % off before the clock runs out.
**CTA:** Claim my seat
**Sign-off:** The Motley Fool Australia Team";

pub const SALES_PAGE_WINNER: &str = "\
### Reference Winner Sales Page
## Headline
The Pass 400,000 Investors Already Hold, Now $119 for One Day

### Introduction
Every market cycle hands a small group of investors an unfair head start. Tonight, that group could include you.

### Key Benefits
- Two research teams, one membership
- Picks across the ASX, growth and dividends
- A track record you can check yourself

### Detailed Body
When the timer hits 11:59 pm, the price goes back up. No extensions, no second chances.

### CTA
**Lock In My $119 Pass**";

// ────────────────────────────────────────────────────────────────────────────
// Structural skeletons
// ────────────────────────────────────────────────────────────────────────────

pub const EMAIL_STRUCTURE: &str = "\
### Subject Line
### Greeting
### Body (benefits, urgency, proofs)
### Call-to-Action
### Sign-off";

pub const SALES_PAGE_STRUCTURE: &str = "\
## Headline
### Introduction
### Key Benefit Paragraphs
### Detailed Body
### Call-to-Action";

// ────────────────────────────────────────────────────────────────────────────
// Generation
// ────────────────────────────────────────────────────────────────────────────

/// Prepended to the assembled instruction block in the user turn.
pub const GENERATION_TASK: &str = r#"### TASK
1. Create a concise INTERNAL bullet plan covering:
   - Hook & opening flow
   - Placement of proof, urgency, CTA
2. Then write the final copy.

Respond ONLY as valid JSON with exactly two keys:
{
  "plan": "<the bullet outline>",
  "copy": "<the finished marketing copy>"
}"#;

/// Revision block. Replace `{original}` before use.
pub const REVISION_TEMPLATE: &str = "\
### ORIGINAL COPY TO REVISE
{original}
### INSTRUCTION:
Rewrite the copy above using the new trait requirements.
IMPORTANT: You MUST preserve the Markdown structure (Headings, Bullets) used in the original.";

pub const FORMATTING_CONSTRAINT: &str =
    "Please limit bullet lists to three or fewer and favour full-sentence paragraphs elsewhere.";

pub const END_INSTRUCTIONS: &str = "### END INSTRUCTIONS";

// ────────────────────────────────────────────────────────────────────────────
// Self-QA
// ────────────────────────────────────────────────────────────────────────────

pub const CRITIQUE_SYSTEM: &str = "You are an obsessive editorial QA bot.";

/// Replace `{copy_type}` and `{draft}`.
pub const CRITIQUE_PROMPT_TEMPLATE: &str = "\
Check copy for:
- Hard requirements
- Structure matches {copy_type}
- Disclaimer present
Return ONLY \"PASS\" or bullet fixes.
--- COPY ---
{draft}
--- END ---";

pub const REVISE_SYSTEM: &str = "Revise copy to address feedback.";

/// Replace `{fixes}` and `{draft}`.
pub const REVISE_PROMPT_TEMPLATE: &str = "\
Apply fixes, output full revised copy ONLY.
### FIXES
{fixes}
### ORIGINAL
{draft}";

/// Locally synthesized critique for drafts under half the minimum length.
/// Replace `{word_count}` and `{min_words}`.
pub const LENGTH_CRITIQUE_TEMPLATE: &str =
    "- Draft is only {word_count} words (Target: {min_words}). Please expand significantly.";

// ────────────────────────────────────────────────────────────────────────────
// Critique feedback (optional, shown to the user)
// ────────────────────────────────────────────────────────────────────────────

pub const FEEDBACK_SYSTEM: &str = "Give concise, constructive feedback.";

/// Replace `{draft}`.
pub const FEEDBACK_PROMPT_TEMPLATE: &str = "\
In 3 bullets – one strength, one weakness, one improvement.
--- COPY ---
{draft}
--- END ---";

// ────────────────────────────────────────────────────────────────────────────
// Variants
// ────────────────────────────────────────────────────────────────────────────

pub const VARIANTS_SYSTEM: &str = "You are a world-class copywriter.";

/// Replace `{n}` and `{copy}`.
pub const VARIANTS_PROMPT_TEMPLATE: &str = r#"Write {n} alternative subject-line/headline ideas AND {n} alternative CTA button labels
for the copy below, preserving tone and urgency.
Return JSON: { "headlines": [...], "ctas": [...] }

--- COPY ---
{copy}
--- END COPY ---"#;

pub const VARIANTS_TEMPERATURE: f32 = 0.8;

// ────────────────────────────────────────────────────────────────────────────
// Locale adaptation
// ────────────────────────────────────────────────────────────────────────────

/// Replace `{target}` and `{original}`.
pub const ADAPT_PROMPT_TEMPLATE: &str = "\
Adapt the following marketing copy for a {target} audience.
Update spelling, currency, market references; preserve tone & structure.

--- ORIGINAL COPY START ---
{original}
--- ORIGINAL COPY END ---
### END INSTRUCTIONS";

/// Fills `{key}` placeholders in one pass over `template`. Inserted values are
/// never rescanned, so model or user text containing `{draft}` stays literal.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let hit = values.iter().find_map(|(key, value)| {
            tail.strip_prefix(key)
                .and_then(|after| after.strip_prefix('}'))
                .map(|after| (*value, after))
        });
        match hit {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
